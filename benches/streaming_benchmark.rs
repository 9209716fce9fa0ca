use cepsheet::batch::process_workbook;
use cepsheet::sample::write_sample;
use cepsheet::types::CellValue;
use cepsheet::{ExcelOptions, ExcelReader, Table};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tempfile::{NamedTempFile, TempDir};

fn cep_table(size: usize) -> Table {
    let ceps: Vec<String> = (0..size)
        .map(|i| format!("{:05}-{:03}", i % 100_000, i % 1000))
        .collect();
    let numbers: Vec<i64> = (0..size as i64).collect();
    Table::from_columns([
        ("CEP", ceps.into_iter().map(CellValue::from).collect::<Vec<_>>()),
        ("Numero", numbers.into_iter().map(CellValue::from).collect()),
    ])
    .unwrap()
}

fn benchmark_table_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("table_write");
    group.sample_size(10);

    for size in [100, 1000, 10000].iter() {
        let table = cep_table(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let temp = NamedTempFile::new().unwrap();
                table
                    .to_excel(temp.path(), &ExcelOptions::default())
                    .unwrap();
            });
        });
    }

    group.finish();
}

fn benchmark_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read");
    group.sample_size(10);

    for size in [1000, 10000].iter() {
        // Prepare test file once
        let temp = NamedTempFile::new().unwrap();
        cep_table(*size)
            .to_excel(temp.path(), &ExcelOptions::default())
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut reader = ExcelReader::open(temp.path()).unwrap();
                for row_result in reader.rows_by_index(0).unwrap() {
                    black_box(row_result.unwrap());
                }
            });
        });
    }

    group.finish();
}

fn benchmark_process_workbook(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_workbook");
    group.sample_size(10);

    for size in [1000, 10000].iter() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("entrada.xlsx");
        cep_table(*size)
            .to_excel(&input, &ExcelOptions::default())
            .unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(process_workbook(&input, dir.path()).unwrap()));
        });
    }

    group.finish();
}

fn benchmark_sample(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    c.bench_function("write_sample", |b| {
        b.iter(|| black_box(write_sample(dir.path()).unwrap()));
    });
}

criterion_group!(
    benches,
    benchmark_table_write,
    benchmark_read,
    benchmark_process_workbook,
    benchmark_sample
);
criterion_main!(benches);
