//! Shared test rows: two constituencies over three general elections, and a
//! small workbook writer for the Excel reader.

use crate::data::DataStore;
use polars::prelude::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use ::zip::write::FileOptions;
use ::zip::ZipWriter;

pub fn frame() -> DataFrame {
    df!(
        "Constituency" => ["Delhi", "Delhi", "Delhi", "Pune", "Pune", "Pune"],
        "State" => ["DL", "DL", "DL", "MH", "MH", "MH"],
        "Year" => [2014i64, 2019, 2024, 2014, 2019, 2024],
        "Electors_Total" => [1000.0, 1200.0, 1300.0, 2000.0, 2200.0, 2400.0],
        "Electors_Male" => [600.0, 650.0, 700.0, 1000.0, 1100.0, 1200.0],
        "Electors_Female" => [400.0, 550.0, 600.0, 1000.0, 1100.0, 1200.0],
        "Votes_Polled_Total" => [650.0, 720.0, 845.0, 1100.0, 1320.0, 1560.0],
        "Votes_Polled_Male" => [400.0, 400.0, 460.0, 600.0, 700.0, 800.0],
        "Votes_Polled_Female" => [250.0, 320.0, 385.0, 500.0, 620.0, 760.0],
        "Votes_Polled_Postal" => [5.0, 8.0, 10.0, 10.0, 12.0, 15.0],
        "Turnout_Ratio_Overall" => [65.0, 60.0, 65.0, 55.0, 60.0, 65.0],
        "Turnout_Ratio_Male" => [66.67, 61.54, 65.71, 60.0, 63.64, 66.67],
        "Turnout_Ratio_Female" => [62.5, 58.18, 64.17, 50.0, 56.36, 63.33],
        "Turnout_Ratio_Postal" => [0.5, 0.67, 0.77, 0.5, 0.55, 0.63]
    )
    .unwrap()
}

pub fn store() -> DataStore {
    DataStore::from_frame(frame()).unwrap()
}

/// A cell of a generated worksheet.
pub enum SheetCell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// Write a single-sheet .xlsx workbook. Text cells go through the shared
/// string table the way spreadsheet applications store them.
pub fn write_workbook(path: &Path, sheet_name: &str, rows: &[Vec<SheetCell>]) {
    let mut strings: Vec<String> = Vec::new();
    let mut sheet_rows = String::new();

    for (r, row) in rows.iter().enumerate() {
        sheet_rows.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
            match cell {
                SheetCell::Text(text) => {
                    let idx = strings.len();
                    strings.push(text.to_string());
                    sheet_rows.push_str(&format!(
                        "<c r=\"{}\" t=\"s\"><v>{}</v></c>",
                        reference, idx
                    ));
                }
                SheetCell::Number(value) => {
                    sheet_rows.push_str(&format!("<c r=\"{}\"><v>{}</v></c>", reference, value));
                }
                SheetCell::Blank => {}
            }
        }
        sheet_rows.push_str("</row>");
    }

    let shared: String = strings
        .iter()
        .map(|s| format!("<si><t>{}</t></si>", s))
        .collect();

    let parts: [(&str, String); 7] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
</Types>"#
                .to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#
                .to_string(),
        ),
        (
            "xl/workbook.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
                sheet_name
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#
                .to_string(),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                sheet_rows
            ),
        ),
        (
            "xl/sharedStrings.xml",
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#,
                strings.len(),
                shared
            ),
        ),
        (
            "xl/styles.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>
</styleSheet>"#
                .to_string(),
        ),
    ];

    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();
    for (name, body) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}
