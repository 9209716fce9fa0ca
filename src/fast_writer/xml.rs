//! XML fragments and helpers shared by the workbook writer

pub(crate) const XML_DECLARATION: &str =
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

pub(crate) const WORKSHEET_START: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheetData>"#;

pub(crate) const WORKSHEET_END: &[u8] = b"</sheetData></worksheet>";

pub(crate) const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

// cellXfs order must follow `CellStyle` discriminants.
pub(crate) const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="2">
<font><sz val="11"/><name val="Calibri"/></font>
<font><b/><sz val="11"/><name val="Calibri"/></font>
</fonts>
<fills count="2">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
</fills>
<borders count="2">
<border><left/><right/><top/><bottom/><diagonal/></border>
<border><left style="thin"/><right style="thin"/><top style="thin"/><bottom style="thin"/><diagonal/></border>
</borders>
<cellStyleXfs count="1">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
</cellStyleXfs>
<cellXfs count="2">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1"><alignment horizontal="center" vertical="top"/></xf>
</cellXfs>
<cellStyles count="1">
<cellStyle name="Normal" xfId="0" builtinId="0"/>
</cellStyles>
</styleSheet>"#;

pub(crate) const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="0" uniqueCount="0"/>
"#;

pub(crate) const APP_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">
<Application>cepsheet</Application>
</Properties>"#;

pub(crate) const CORE_PROPS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
<dc:creator>cepsheet</dc:creator>
</cp:coreProperties>"#;

/// `[Content_Types].xml` for a workbook with `sheet_count` worksheets
pub(crate) fn content_types(sheet_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECLARATION}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
<Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#
    );

    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"
<Override PartName="/xl/worksheets/sheet{i}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }

    xml.push_str("\n</Types>");
    xml
}

/// `xl/workbook.xml` listing the sheets in order
pub(crate) fn workbook(sheet_names: &[String]) -> String {
    let mut xml = format!(
        r#"{XML_DECLARATION}
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets>"#
    );

    for (i, name) in sheet_names.iter().enumerate() {
        let mut escaped = Vec::with_capacity(name.len());
        write_escaped(&mut escaped, name);
        xml.push_str(&format!(
            r#"
<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            String::from_utf8_lossy(&escaped),
            i + 1,
            i + 1
        ));
    }

    xml.push_str("\n</sheets>\n</workbook>");
    xml
}

/// `xl/_rels/workbook.xml.rels`: worksheets first, then styles and shared strings
pub(crate) fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECLARATION}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
    );

    for i in 1..=sheet_count {
        xml.push_str(&format!(
            r#"
<Relationship Id="rId{i}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{i}.xml"/>"#
        ));
    }

    xml.push_str(&format!(
        r#"
<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#,
        sheet_count + 1,
        sheet_count + 2
    ));
    xml
}

/// Append the column letters for a 1-based column number
pub(crate) fn push_column_letter(buffer: &mut Vec<u8>, mut n: u32) {
    if n == 0 {
        return;
    }
    let mut tmp = [0u8; 10];
    let mut len = 0;
    while n > 0 {
        let rem = (n - 1) % 26;
        tmp[len] = b'A' + rem as u8;
        len += 1;
        n = (n - 1) / 26;
    }
    buffer.extend(tmp[..len].iter().rev());
}

/// Append `s` with the five XML special characters escaped
///
/// Control characters XML 1.0 forbids (everything below U+0020 except tab,
/// newline and carriage return) are written as `_xHHHH_`, the escape
/// SpreadsheetML readers decode.
pub(crate) fn write_escaped(buffer: &mut Vec<u8>, s: &str) {
    for c in s.chars() {
        match c {
            '&' => buffer.extend_from_slice(b"&amp;"),
            '<' => buffer.extend_from_slice(b"&lt;"),
            '>' => buffer.extend_from_slice(b"&gt;"),
            '"' => buffer.extend_from_slice(b"&quot;"),
            '\'' => buffer.extend_from_slice(b"&apos;"),
            '\u{0}'..='\u{1f}' if !matches!(c, '\t' | '\n' | '\r') => {
                buffer.extend_from_slice(format!("_x{:04X}_", c as u32).as_bytes());
            }
            _ => {
                let mut buf = [0; 4];
                buffer.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
}

/// Reverse of [`write_escaped`], plus numeric character references
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let Some(semi) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = &tail[1..semi];
        let decoded = match entity {
            "lt" => Some('<'),
            "gt" => Some('>'),
            "amp" => Some('&'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => entity
                .strip_prefix("#x")
                .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                .and_then(char::from_u32),
        };
        match decoded {
            Some(ch) => out.push(ch),
            None => out.push_str(&tail[..=semi]),
        }
        rest = &tail[semi + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        let mut buf = Vec::new();
        push_column_letter(&mut buf, 1);
        assert_eq!(buf, b"A");

        buf.clear();
        push_column_letter(&mut buf, 28);
        assert_eq!(buf, b"AB");

        buf.clear();
        push_column_letter(&mut buf, 702);
        assert_eq!(buf, b"ZZ");

        buf.clear();
        push_column_letter(&mut buf, 703);
        assert_eq!(buf, b"AAA");
    }

    #[test]
    fn test_control_characters_are_encoded() {
        let mut buf = Vec::new();
        write_escaped(&mut buf, "a\u{1}b\tc\nd\u{1f}");
        let escaped = String::from_utf8(buf).unwrap();
        assert_eq!(escaped, "a_x0001_b\tc\nd_x001F_");
        assert!(!escaped.bytes().any(|b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r')));
    }

    #[test]
    fn test_escape_and_decode() {
        let mut buf = Vec::new();
        write_escaped(&mut buf, r#"<a & "b" 'c'>"#);
        let escaped = String::from_utf8(buf).unwrap();
        assert_eq!(escaped, "&lt;a &amp; &quot;b&quot; &apos;c&apos;&gt;");
        assert_eq!(decode_entities(&escaped), r#"<a & "b" 'c'>"#);
    }

    #[test]
    fn test_decode_numeric_references() {
        assert_eq!(decode_entities("S&#xE3;o Paulo"), "São Paulo");
        assert_eq!(decode_entities("&#65;B"), "AB");
        assert_eq!(decode_entities("a & b"), "a & b");
        assert_eq!(decode_entities("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_workbook_lists_sheets() {
        let xml = workbook(&["Sheet1".to_string(), "A&B".to_string()]);
        assert!(xml.contains(r#"<sheet name="Sheet1" sheetId="1" r:id="rId1"/>"#));
        assert!(xml.contains(r#"<sheet name="A&amp;B" sheetId="2" r:id="rId2"/>"#));
    }
}
