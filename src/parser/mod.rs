//! Parser Module
//!
//! calamineをワークブックデコーダーとして使用し、シートを `Sheet` グリッドに変換する。

mod workbook;

pub(crate) use workbook::WorkbookParser;
