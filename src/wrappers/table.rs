//! Table wrappers: Table, Rows/Columns, Cell, CellRange.

use crate::api::{ApiModel, TableApi, detect_merge_regions};
use crate::automation::{Handle, Variant, upstream};
use crate::common::{Rect, Result};
use crate::host::Host;
use crate::resolve::resolve_ambient_table;
use crate::wrappers::{Shape, Shapes, TextFrame, collection_count, collection_item};

/// Convenience input for [`Table::make`].
pub enum TableSource {
    /// An empty `rows x cols` grid
    Size(usize, usize),
    /// A 2-D array of cell texts
    Values(Vec<Vec<String>>),
}

impl From<(usize, usize)> for TableSource {
    fn from(size: (usize, usize)) -> Self {
        TableSource::Size(size.0, size.1)
    }
}

impl From<Vec<Vec<String>>> for TableSource {
    fn from(values: Vec<Vec<String>>) -> Self {
        TableSource::Values(values)
    }
}

impl From<Vec<Vec<&str>>> for TableSource {
    fn from(values: Vec<Vec<&str>>) -> Self {
        TableSource::Values(
            values
                .into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }
}

/// One live table.
#[derive(Debug, Clone)]
pub struct Table {
    api: Handle,
}

impl Table {
    pub(crate) fn new(api: Handle) -> Self {
        Self { api }
    }

    /// The ambient table: the selected table shape, else the first table
    /// on the ambient slide.
    pub fn active() -> Result<Self> {
        Ok(Self { api: resolve_ambient_table(None)? })
    }

    /// Same as [`Table::active`] against an explicit host.
    pub fn active_on(host: &Host) -> Result<Self> {
        Ok(Self { api: resolve_ambient_table(Some(host))? })
    }

    /// Build a table on a slide from a size or a 2-D text array.
    pub fn make(shapes: &Shapes, source: impl Into<TableSource>) -> Result<Table> {
        match source.into() {
            TableSource::Size(rows, cols) => shapes.add_table(rows, cols, None)?.table(),
            TableSource::Values(values) => {
                let rows = values.len().max(1);
                let cols = values.iter().map(Vec::len).max().unwrap_or(1).max(1);
                let table = shapes.add_table(rows, cols, None)?.table()?;
                for (r, row) in values.iter().enumerate() {
                    for (c, text) in row.iter().enumerate() {
                        table.cell(r, c)?.text_frame()?.text_range()?.set_text(text)?;
                    }
                }
                Ok(table)
            }
        }
    }

    /// The raw handle.
    pub fn api(&self) -> &Handle {
        &self.api
    }

    /// The shape carrying this table.
    pub fn shape(&self) -> Result<Shape> {
        Ok(Shape::from_api(upstream(&self.api, "Shape")?))
    }

    /// The row collection.
    pub fn rows(&self) -> Result<Rows> {
        Ok(Rows { api: self.api.get_object("Rows")?, table: self.api.clone() })
    }

    /// The column collection.
    pub fn columns(&self) -> Result<Columns> {
        Ok(Columns { api: self.api.get_object("Columns")? })
    }

    pub fn n_rows(&self) -> Result<usize> {
        Ok(collection_count(&self.api.get_object("Rows")?)? as usize)
    }

    pub fn n_cols(&self) -> Result<usize> {
        Ok(collection_count(&self.api.get_object("Columns")?)? as usize)
    }

    /// The cell at `(row, col)`, 0-based.
    pub fn cell(&self, row: usize, col: usize) -> Result<Cell> {
        Ok(Cell {
            api: self
                .api
                .call("Cell", &[Variant::Int(row as i64 + 1), Variant::Int(col as i64 + 1)])?
                .into_object()?,
        })
    }

    /// A rectangular view over part of the table (0-based, end-exclusive).
    pub fn cell_range(
        &self,
        rows: std::ops::Range<usize>,
        cols: std::ops::Range<usize>,
    ) -> CellRange {
        CellRange { table: self.clone(), rows, cols }
    }

    /// The current merge topology, recovered from cell geometry.
    pub fn merge_regions(&self) -> Result<crate::api::CellMergeApi> {
        detect_merge_regions(&self.api, self.n_rows()?, self.n_cols()?)
    }

    /// Capture the whole table as a model.
    pub fn to_model(&self) -> Result<TableApi> {
        TableApi::from_api(&self.api)
    }

    /// Apply a model onto this table.
    pub fn apply_model(&self, model: &TableApi) -> Result<()> {
        model.apply_api(&self.api)
    }

    /// Shrink every row, then every column, to near-minimal extent. The
    /// host clamps to whatever its content needs.
    pub fn tighten(&self) -> Result<()> {
        let rows = self.rows()?;
        for i in 0..rows.len()? {
            rows.get(i)?.set_height(1.0)?;
        }
        let columns = self.columns()?;
        for i in 0..columns.len()? {
            columns.get(i)?.set_width(1.0)?;
        }
        Ok(())
    }
}

/// The rows of one table.
#[derive(Debug, Clone)]
pub struct Rows {
    api: Handle,
    table: Handle,
}

impl Rows {
    pub fn len(&self) -> Result<usize> {
        Ok(collection_count(&self.api)? as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The row at `index` (0-based).
    pub fn get(&self, index: usize) -> Result<Row> {
        Ok(Row {
            api: collection_item(&self.api, index as i64 + 1)?,
            table: self.table.clone(),
            index,
        })
    }

    /// Insert new rows before the given positions (0-based). Indices are
    /// processed in descending order so earlier insertions do not shift
    /// later ones.
    pub fn insert(&self, indices: &[usize]) -> Result<()> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        for index in sorted {
            self.api.call("Add", &[Variant::Int(index as i64 + 1)])?;
        }
        Ok(())
    }

    /// Append a row.
    pub fn append(&self) -> Result<Row> {
        let api = self.api.call("Add", &[])?.into_object()?;
        Ok(Row { api, table: self.table.clone(), index: self.len()? - 1 })
    }

    /// Delete the rows at the given positions (0-based), descending.
    pub fn delete(&self, indices: &[usize]) -> Result<()> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();
        for index in sorted {
            self.get(index)?.delete()?;
        }
        Ok(())
    }
}

/// One table row.
///
/// Host rows expose no index of their own, so the row remembers the
/// position it was fetched at; it goes stale when rows above it are
/// inserted or deleted.
#[derive(Debug, Clone)]
pub struct Row {
    api: Handle,
    table: Handle,
    index: usize,
}

impl Row {
    pub fn height(&self) -> Result<f64> {
        self.api.get_f64("Height")
    }

    pub fn set_height(&self, height: f64) -> Result<()> {
        self.api.set("Height", Variant::Float(height))
    }

    pub fn delete(&self) -> Result<()> {
        self.api.call("Delete", &[])?;
        Ok(())
    }

    /// The cells of this row, left to right.
    pub fn cells(&self) -> Result<Vec<Cell>> {
        let table = Table::new(self.table.clone());
        (0..table.n_cols()?).map(|c| table.cell(self.index, c)).collect()
    }
}

/// The columns of one table.
#[derive(Debug, Clone)]
pub struct Columns {
    api: Handle,
}

impl Columns {
    pub fn len(&self) -> Result<usize> {
        Ok(collection_count(&self.api)? as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The column at `index` (0-based).
    pub fn get(&self, index: usize) -> Result<Column> {
        Ok(Column { api: collection_item(&self.api, index as i64 + 1)? })
    }

    /// Insert new columns before the given positions (0-based),
    /// descending.
    pub fn insert(&self, indices: &[usize]) -> Result<()> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        for index in sorted {
            self.api.call("Add", &[Variant::Int(index as i64 + 1)])?;
        }
        Ok(())
    }

    /// Append a column.
    pub fn append(&self) -> Result<Column> {
        Ok(Column { api: self.api.call("Add", &[])?.into_object()? })
    }

    /// Delete the columns at the given positions (0-based), descending.
    pub fn delete(&self, indices: &[usize]) -> Result<()> {
        let mut sorted = indices.to_vec();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();
        for index in sorted {
            self.get(index)?.delete()?;
        }
        Ok(())
    }
}

/// One table column.
#[derive(Debug, Clone)]
pub struct Column {
    api: Handle,
}

impl Column {
    pub fn width(&self) -> Result<f64> {
        self.api.get_f64("Width")
    }

    pub fn set_width(&self, width: f64) -> Result<()> {
        self.api.set("Width", Variant::Float(width))
    }

    pub fn delete(&self) -> Result<()> {
        self.api.call("Delete", &[])?;
        Ok(())
    }
}

/// One table cell.
#[derive(Debug, Clone)]
pub struct Cell {
    api: Handle,
}

impl Cell {
    /// The raw handle.
    pub fn api(&self) -> &Handle {
        &self.api
    }

    /// The cell's text frame.
    pub fn text_frame(&self) -> Result<TextFrame> {
        Ok(TextFrame::new(self.api.get_object("Shape.TextFrame")?))
    }

    /// The cell text.
    pub fn text(&self) -> Result<String> {
        self.text_frame()?.text_range()?.text()
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        self.text_frame()?.text_range()?.set_text(text)
    }

    /// The cell's geometry box in slide points. Cells of one merge
    /// region all report the region's box.
    pub fn rect(&self) -> Result<Rect> {
        let shape = self.api.get_object("Shape")?;
        Ok(Rect::new(
            shape.get_f64("Left")?,
            shape.get_f64("Top")?,
            shape.get_f64("Width")?,
            shape.get_f64("Height")?,
        ))
    }

    /// Merge this cell with another into one rectangular region.
    pub fn merge(&self, other: &Cell) -> Result<()> {
        self.api.call("Merge", &[Variant::Object(other.api.clone())])?;
        Ok(())
    }
}

/// A rectangular sub-view of a table.
#[derive(Debug, Clone)]
pub struct CellRange {
    table: Table,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
}

impl CellRange {
    /// The cells of the view, row-major.
    pub fn cells(&self) -> Result<Vec<Cell>> {
        let mut out = Vec::new();
        for r in self.rows.clone() {
            for c in self.cols.clone() {
                out.push(self.table.cell(r, c)?);
            }
        }
        Ok(out)
    }

    /// Set the same text in every cell of the view.
    pub fn set_text(&self, text: &str) -> Result<()> {
        for cell in self.cells()? {
            cell.set_text(text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;
    use crate::wrappers::Slide;

    fn slide() -> Slide {
        let mock = MockHost::new();
        let pres = mock.add_presentation().unwrap();
        Slide::from_api(MockHost::add_slide(&pres).unwrap())
    }

    #[test]
    fn test_make_from_values() {
        let slide = slide();
        let table = Table::make(&slide.shapes(), vec![vec!["a", "b"], vec!["c", "d"]]).unwrap();
        assert_eq!(table.n_rows().unwrap(), 2);
        assert_eq!(table.n_cols().unwrap(), 2);
        assert_eq!(table.cell(1, 0).unwrap().text().unwrap(), "c");
    }

    #[test]
    fn test_insert_and_delete_rows_descending() {
        let slide = slide();
        let table = Table::make(&slide.shapes(), (3, 2)).unwrap();
        table.cell(0, 0).unwrap().set_text("first").unwrap();
        table.cell(2, 0).unwrap().set_text("last").unwrap();

        // Insert before rows 0 and 2 in one call.
        table.rows().unwrap().insert(&[0, 2]).unwrap();
        assert_eq!(table.n_rows().unwrap(), 5);
        assert_eq!(table.cell(1, 0).unwrap().text().unwrap(), "first");
        assert_eq!(table.cell(4, 0).unwrap().text().unwrap(), "last");

        table.rows().unwrap().delete(&[0, 3]).unwrap();
        assert_eq!(table.n_rows().unwrap(), 3);
        assert_eq!(table.cell(0, 0).unwrap().text().unwrap(), "first");
        assert_eq!(table.cell(2, 0).unwrap().text().unwrap(), "last");
    }

    #[test]
    fn test_merge_and_shared_box() {
        let slide = slide();
        let table = Table::make(&slide.shapes(), (2, 2)).unwrap();
        let a = table.cell(0, 0).unwrap();
        let b = table.cell(0, 1).unwrap();
        a.merge(&b).unwrap();
        assert_eq!(a.rect().unwrap(), b.rect().unwrap());
        let merge = table.merge_regions().unwrap();
        assert_eq!(merge.regions.len(), 1);
    }

    #[test]
    fn test_cell_range_view() {
        let slide = slide();
        let table = Table::make(&slide.shapes(), (3, 3)).unwrap();
        table.cell_range(0..1, 0..3).set_text("header").unwrap();
        assert_eq!(table.cell(0, 2).unwrap().text().unwrap(), "header");
        assert_eq!(table.cell(1, 0).unwrap().text().unwrap(), "");
    }
}
