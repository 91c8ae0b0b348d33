//! Excel workbook store: read with calamine, rewritten with rust_xlsxwriter.

use std::path::{Path, PathBuf};

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::{debug, warn};

use super::{tax_id_column, RecordStore, Result};
use crate::error::StoreError;
use crate::models::customer::CustomerRecord;

/// Customer sheet stored as the first worksheet of an `.xlsx` file.
///
/// An append rewrites the whole workbook: every worksheet is kept in order
/// with its values and formulas. Cell formatting is not carried over.
pub struct XlsxStore {
    path: PathBuf,
    sheet_name: String,
}

/// One worksheet, padded so that `grid[r][c]` is cell (r, c).
struct Sheet {
    name: String,
    grid: Vec<Vec<Data>>,
    /// Formula text by absolute position, written over the cached value.
    formulas: Vec<(u32, u16, String)>,
}

impl Sheet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            grid: Vec::new(),
            formulas: Vec::new(),
        }
    }

    /// True when the sheet has at most one row and its first cell is empty.
    fn is_blank(&self) -> bool {
        self.grid.len() <= 1
            && self
                .grid
                .first()
                .and_then(|row| row.first())
                .is_none_or(|cell| *cell == Data::Empty)
    }

    fn contains(&self, tax_id: &str) -> bool {
        let Some(header) = self.grid.first() else {
            return false;
        };

        let Some(column) = tax_id_column(header.iter().map(cell_str)) else {
            debug!("No RUT column in header");
            return false;
        };

        self.grid
            .iter()
            .skip(1)
            .any(|row| matches!(row.get(column), Some(Data::String(s)) if s == tax_id))
    }
}

impl XlsxStore {
    /// Create a store for `path`. Nothing is touched on disk until `append`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            sheet_name: "Clientes".to_string(),
        }
    }

    /// Set the worksheet name used when the workbook is created.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Read every worksheet; the customer sheet comes first.
    fn load(&self) -> Result<Vec<Sheet>> {
        let mut workbook: Xlsx<_> = open_workbook(&self.path).map_err(|e| self.open_error(e))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| self.open_error(e))?;
            let formulas = workbook
                .worksheet_formula(&name)
                .map_err(|e| self.open_error(e))?;

            let (first_row, first_col) = range.start().unwrap_or((0, 0));
            let mut grid = vec![Vec::new(); first_row as usize];
            for row in range.rows() {
                let mut cells = vec![Data::Empty; first_col as usize];
                cells.extend(row.iter().cloned());
                grid.push(cells);
            }

            let (formula_row, formula_col) = formulas.start().unwrap_or((0, 0));
            let formulas = formulas
                .used_cells()
                .map(|(r, c, f)| {
                    (
                        formula_row + r as u32,
                        (formula_col as usize + c) as u16,
                        f.clone(),
                    )
                })
                .collect();

            sheets.push(Sheet {
                name,
                grid,
                formulas,
            });
        }

        debug!("Loaded {} worksheets from {}", sheets.len(), self.path.display());
        Ok(sheets)
    }

    fn save(&self, sheets: &[Sheet]) -> Result<()> {
        let mut workbook = Workbook::new();

        for sheet in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name).map_err(|e| self.save_error(e))?;

            for (r, row) in sheet.grid.iter().enumerate() {
                for (c, cell) in row.iter().enumerate() {
                    write_cell(worksheet, r as u32, c as u16, cell)
                        .map_err(|e| self.save_error(e))?;
                }
            }

            for (row, col, formula) in &sheet.formulas {
                worksheet
                    .write_formula(*row, *col, formula.as_str())
                    .map_err(|e| self.save_error(e))?;
            }
        }

        workbook.save(&self.path).map_err(|e| self.save_error(e))
    }

    fn open_error(&self, e: impl std::fmt::Display) -> StoreError {
        StoreError::Open {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }

    fn save_error(&self, e: XlsxError) -> StoreError {
        StoreError::Save {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }
}

impl RecordStore for XlsxStore {
    fn path(&self) -> &Path {
        &self.path
    }

    fn exists(&self, tax_id: &str) -> bool {
        if !self.path.exists() {
            return false;
        }

        match self.load() {
            Ok(sheets) => sheets.first().is_some_and(|sheet| sheet.contains(tax_id)),
            Err(e) => {
                warn!("Could not check for duplicates, continuing: {}", e);
                false
            }
        }
    }

    fn append(&mut self, record: &CustomerRecord) -> Result<()> {
        let mut sheets = if self.path.exists() {
            self.load()?
        } else {
            debug!("Creating {}", self.path.display());
            Vec::new()
        };
        if sheets.is_empty() {
            sheets.push(Sheet::new(&self.sheet_name));
        }

        let sheet = &mut sheets[0];
        if sheet.is_blank() {
            sheet.grid = vec![
                CustomerRecord::headers()
                    .iter()
                    .map(|h| Data::String(h.to_string()))
                    .collect(),
            ];
        }

        sheet.grid.push(
            record
                .to_row()
                .iter()
                .map(|v| v.map_or(Data::Empty, |s| Data::String(s.to_string())))
                .collect(),
        );

        let row_count = sheet.grid.len();
        self.save(&sheets)?;
        debug!("Appended row {} to {}", row_count, self.path.display());
        Ok(())
    }

    fn rows(&self) -> Result<Vec<Vec<String>>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let sheets = self.load()?;
        Ok(sheets
            .first()
            .map(|sheet| {
                sheet
                    .grid
                    .iter()
                    .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                    .collect()
            })
            .unwrap_or_default())
    }
}

fn cell_str(cell: &Data) -> &str {
    match cell {
        Data::String(s) => s,
        _ => "",
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Data,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Data::Empty => return Ok(()),
        Data::String(s) => worksheet.write_string(row, col, s.as_str())?,
        Data::Float(f) => worksheet.write_number(row, col, *f)?,
        Data::Int(i) => worksheet.write_number(row, col, *i as f64)?,
        Data::Bool(b) => worksheet.write_boolean(row, col, *b)?,
        other => worksheet.write_string(row, col, other.to_string())?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::customer::Field;
    use pretty_assertions::assert_eq;

    fn customer(tax_id: &str) -> CustomerRecord {
        CustomerRecord::default()
            .with(Field::LegalName, "ACME SPA")
            .with(Field::TaxId, tax_id)
            .with(Field::Phone, "+569 12345678")
    }

    #[test]
    fn test_missing_file_has_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = XlsxStore::new(dir.path().join("clientes.xlsx"));

        assert!(!store.exists("76.543.210-3"));
        assert!(store.rows().unwrap().is_empty());
    }

    #[test]
    fn test_append_creates_header_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = XlsxStore::new(dir.path().join("clientes.xlsx"));

        store.append(&customer("76.543.210-3")).unwrap();

        let rows = store.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], CustomerRecord::headers().map(String::from).to_vec());
        assert_eq!(rows[1][0], "ACME SPA");
        assert_eq!(rows[1][1], "76.543.210-3");
        assert_eq!(rows[1][7], "+569 12345678");
    }

    #[test]
    fn test_append_then_exists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = XlsxStore::new(dir.path().join("clientes.xlsx"));

        store.append(&customer("76.543.210-3")).unwrap();
        store.append(&customer("11.111.111-1")).unwrap();

        assert!(store.exists("76.543.210-3"));
        assert!(store.exists("11.111.111-1"));
        assert!(!store.exists("5.126.663-3"));
        assert_eq!(store.len().unwrap(), 2);

        let rows = store.rows().unwrap();
        assert_eq!(rows[1][1], "76.543.210-3");
        assert_eq!(rows[2][1], "11.111.111-1");
    }

    #[test]
    fn test_header_is_kept_on_later_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clientes.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Hoja1").unwrap();
        worksheet.write_string(0, 0, "Cliente").unwrap();
        worksheet.write_string(0, 1, "RUT").unwrap();
        worksheet.write_string(1, 0, "VIEJO").unwrap();
        worksheet.write_string(1, 1, "11.111.111-1").unwrap();
        worksheet.write_number(1, 2, 42.0).unwrap();
        workbook.save(&path).unwrap();

        let mut store = XlsxStore::new(&path);
        assert!(store.exists("11.111.111-1"));

        store.append(&customer("76.543.210-3")).unwrap();

        let rows = store.rows().unwrap();
        assert_eq!(rows[0][0], "Cliente");
        assert_eq!(rows[0][1], "RUT");
        assert_eq!(rows[1][2], "42");
        assert_eq!(rows[2][1], "76.543.210-3");

        let workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Hoja1".to_string()]);
    }

    #[test]
    fn test_append_keeps_other_worksheets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clientes.xlsx");

        let mut workbook = Workbook::new();
        let clientes = workbook.add_worksheet();
        clientes.set_name("Clientes").unwrap();
        clientes.write_string(0, 1, "RUT").unwrap();
        clientes.write_string(1, 1, "11.111.111-1").unwrap();
        let notas = workbook.add_worksheet();
        notas.set_name("Notas").unwrap();
        notas.write_string(0, 0, "revisar").unwrap();
        notas.write_number(1, 0, 2.0).unwrap();
        notas.write_formula(2, 0, "=A2*3").unwrap();
        workbook.save(&path).unwrap();

        let mut store = XlsxStore::new(&path);
        store.append(&customer("76.543.210-3")).unwrap();
        store.append(&customer("5.126.663-3")).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(
            workbook.sheet_names(),
            vec!["Clientes".to_string(), "Notas".to_string()]
        );

        let notas = workbook.worksheet_range("Notas").unwrap();
        assert_eq!(notas.get_value((0, 0)), Some(&Data::String("revisar".to_string())));
        assert_eq!(notas.get_value((1, 0)), Some(&Data::Float(2.0)));

        let formulas = workbook.worksheet_formula("Notas").unwrap();
        assert!(formulas.used_cells().any(|(_, _, f)| f.contains("A2*3")));

        assert!(store.exists("11.111.111-1"));
        assert!(store.exists("5.126.663-3"));
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn test_no_rut_column_means_not_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("otro.xlsx");

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.write_string(0, 0, "Nombre").unwrap();
        worksheet.write_string(1, 0, "76.543.210-3").unwrap();
        workbook.save(&path).unwrap();

        assert!(!XlsxStore::new(&path).exists("76.543.210-3"));
    }

    #[test]
    fn test_blank_workbook_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vacio.xlsx");

        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        workbook.save(&path).unwrap();

        let mut store = XlsxStore::new(&path);
        store.append(&customer("76.543.210-3")).unwrap();

        let rows = store.rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], "RUT");
    }

    #[test]
    fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roto.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        let mut store = XlsxStore::new(&path);
        assert!(!store.exists("76.543.210-3"));
        assert!(matches!(
            store.append(&customer("76.543.210-3")),
            Err(StoreError::Open { .. })
        ));
    }
}
