//! Table model: rows, columns, cell text, and merge topology.

use crate::api::{ApiModel, TextFrameApi};
use crate::automation::{Handle, Variant};
use crate::common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One rectangular merge region, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MergeRegion {
    pub row: usize,
    pub col: usize,
    pub n_rows: usize,
    pub n_cols: usize,
}

impl MergeRegion {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.row..self.row + self.n_rows).contains(&row)
            && (self.col..self.col + self.n_cols).contains(&col)
    }

    fn overlaps(&self, other: &MergeRegion) -> bool {
        self.row < other.row + other.n_rows
            && other.row < self.row + self.n_rows
            && self.col < other.col + other.n_cols
            && other.col < self.col + self.n_cols
    }
}

/// The set of merge regions of one table.
///
/// Regions are kept sorted and must not overlap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CellMergeApi {
    pub regions: Vec<MergeRegion>,
}

impl CellMergeApi {
    /// Build a validated merge set.
    pub fn new(mut regions: Vec<MergeRegion>) -> Result<Self> {
        regions.sort();
        for pair in regions.windows(2) {
            if pair[0] == pair[1] {
                return Err(Error::invalid_value("CellMerge", "duplicate merge region"));
            }
        }
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                if a.overlaps(b) {
                    return Err(Error::invalid_value("CellMerge", "merge regions overlap"));
                }
            }
        }
        Ok(Self { regions })
    }

    /// The region covering a cell, if any.
    pub fn region_of(&self, row: usize, col: usize) -> Option<&MergeRegion> {
        self.regions.iter().find(|r| r.contains(row, col))
    }

    /// Whether the cell is covered by a region without being its anchor
    /// (top-left cell).
    pub fn is_covered(&self, row: usize, col: usize) -> bool {
        self.region_of(row, col)
            .is_some_and(|r| (r.row, r.col) != (row, col))
    }
}

/// One cell: its text frame, or nothing when the cell is covered by a
/// merge region (the content lives in the region's anchor).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableCellApi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_frame: Option<TextFrameApi>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRowApi {
    pub height: f64,
    pub cells: Vec<TableCellApi>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TableColumnApi {
    pub width: f64,
}

/// Mirror of a `Table` sub-object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableApi {
    pub rows: Vec<TableRowApi>,
    pub columns: Vec<TableColumnApi>,
    #[serde(default, skip_serializing_if = "merge_is_empty")]
    pub merge: CellMergeApi,
}

fn merge_is_empty(merge: &CellMergeApi) -> bool {
    merge.regions.is_empty()
}

impl TableApi {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }
}

fn cell(table: &Handle, row: usize, col: usize) -> Result<Handle> {
    table
        .call("Cell", &[Variant::Int(row as i64 + 1), Variant::Int(col as i64 + 1)])?
        .into_object()
}

/// Recover the merge topology by equating cell geometry: every cell of a
/// merge region reports the region's box, so grouping positions that
/// share a box yields the regions.
pub(crate) fn detect_merge_regions(table: &Handle, n_rows: usize, n_cols: usize) -> Result<CellMergeApi> {
    let mut by_box: BTreeMap<[i64; 4], Vec<(usize, usize)>> = BTreeMap::new();
    for r in 0..n_rows {
        for c in 0..n_cols {
            let shape = cell(table, r, c)?.get_object("Shape")?;
            let quantized = [
                (shape.get_f64("Left")? * 100.0).round() as i64,
                (shape.get_f64("Top")? * 100.0).round() as i64,
                (shape.get_f64("Width")? * 100.0).round() as i64,
                (shape.get_f64("Height")? * 100.0).round() as i64,
            ];
            by_box.entry(quantized).or_default().push((r, c));
        }
    }
    let mut regions = Vec::new();
    for (_, cells) in by_box {
        if cells.len() < 2 {
            continue;
        }
        let row = cells.iter().map(|&(r, _)| r).min().unwrap_or(0);
        let col = cells.iter().map(|&(_, c)| c).min().unwrap_or(0);
        let n_rows = cells.iter().map(|&(r, _)| r).max().unwrap_or(0) - row + 1;
        let n_cols = cells.iter().map(|&(_, c)| c).max().unwrap_or(0) - col + 1;
        if n_rows * n_cols != cells.len() {
            tracing::warn!(?cells, "cells sharing a box do not form a rectangle; skipping");
            continue;
        }
        regions.push(MergeRegion { row, col, n_rows, n_cols });
    }
    CellMergeApi::new(regions)
}

impl ApiModel for TableApi {
    fn from_api(table: &Handle) -> Result<Self> {
        let rows_handle = table.get_object("Rows")?;
        let cols_handle = table.get_object("Columns")?;
        let n_rows = rows_handle.get_i64("Count")? as usize;
        let n_cols = cols_handle.get_i64("Count")? as usize;

        let merge = detect_merge_regions(table, n_rows, n_cols)?;

        let mut columns = Vec::with_capacity(n_cols);
        for c in 0..n_cols {
            let column = cols_handle.call("Item", &[Variant::Int(c as i64 + 1)])?.into_object()?;
            columns.push(TableColumnApi { width: column.get_f64("Width")? });
        }

        let mut rows = Vec::with_capacity(n_rows);
        for r in 0..n_rows {
            let row = rows_handle.call("Item", &[Variant::Int(r as i64 + 1)])?.into_object()?;
            let mut cells = Vec::with_capacity(n_cols);
            for c in 0..n_cols {
                let text_frame = if merge.is_covered(r, c) {
                    None
                } else {
                    Some(TextFrameApi::from_api(&cell(table, r, c)?.get_object("Shape.TextFrame")?)?)
                };
                cells.push(TableCellApi { text_frame });
            }
            rows.push(TableRowApi { height: row.get_f64("Height")?, cells });
        }

        Ok(Self { rows, columns, merge })
    }

    fn apply_api(&self, table: &Handle) -> Result<()> {
        let rows_handle = table.get_object("Rows")?;
        let cols_handle = table.get_object("Columns")?;

        // Grow or shrink the grid to the model's dimensions.
        while (rows_handle.get_i64("Count")? as usize) < self.n_rows() {
            rows_handle.call("Add", &[])?;
        }
        while (rows_handle.get_i64("Count")? as usize) > self.n_rows().max(1) {
            let last = rows_handle.get_i64("Count")?;
            rows_handle.call("Item", &[Variant::Int(last)])?.into_object()?.call("Delete", &[])?;
        }
        while (cols_handle.get_i64("Count")? as usize) < self.n_cols() {
            cols_handle.call("Add", &[])?;
        }
        while (cols_handle.get_i64("Count")? as usize) > self.n_cols().max(1) {
            let last = cols_handle.get_i64("Count")?;
            cols_handle.call("Item", &[Variant::Int(last)])?.into_object()?.call("Delete", &[])?;
        }

        for (r, row) in self.rows.iter().enumerate() {
            rows_handle
                .call("Item", &[Variant::Int(r as i64 + 1)])?
                .into_object()?
                .set("Height", Variant::Float(row.height))?;
        }
        for (c, column) in self.columns.iter().enumerate() {
            cols_handle
                .call("Item", &[Variant::Int(c as i64 + 1)])?
                .into_object()?
                .set("Width", Variant::Float(column.width))?;
        }

        // Merge topology: merge what the model has and the table lacks;
        // an extra live merge cannot be undone here, only reported.
        let live = detect_merge_regions(table, self.n_rows(), self.n_cols())?;
        for region in &self.merge.regions {
            if live.regions.contains(region) {
                continue;
            }
            let anchor = cell(table, region.row, region.col)?;
            let opposite = cell(table, region.row + region.n_rows - 1, region.col + region.n_cols - 1)?;
            if let Err(err) = anchor.call("Merge", &[Variant::Object(opposite)]) {
                tracing::warn!(?region, %err, "could not merge cells");
            }
        }
        for region in &live.regions {
            if !self.merge.regions.contains(region) {
                tracing::warn!(?region, "live merge region absent from the model; cannot split");
            }
        }

        for (r, row) in self.rows.iter().enumerate() {
            for (c, model_cell) in row.cells.iter().enumerate() {
                if let Some(frame) = &model_cell.text_frame {
                    frame.apply_api(&cell(table, r, c)?.get_object("Shape.TextFrame")?)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    fn table_shape(rows: i64, cols: i64) -> Handle {
        let host = MockHost::new();
        let pres = host.add_presentation().unwrap();
        let slide = MockHost::add_slide(&pres).unwrap();
        slide
            .get_object("Shapes")
            .unwrap()
            .call(
                "AddTable",
                &[
                    Variant::Int(rows),
                    Variant::Int(cols),
                    Variant::Float(10.0),
                    Variant::Float(10.0),
                    Variant::Float(300.0),
                    Variant::Float(120.0),
                ],
            )
            .unwrap()
            .into_object()
            .unwrap()
    }

    fn set_cell_text(table: &Handle, row: usize, col: usize, text: &str) {
        cell(table, row, col)
            .unwrap()
            .get_object("Shape.TextFrame.TextRange")
            .unwrap()
            .set("Text", text)
            .unwrap();
    }

    #[test]
    fn test_merge_detection_from_geometry() {
        let shape = table_shape(3, 2);
        let table = shape.get_object("Table").unwrap();
        cell(&table, 0, 0)
            .unwrap()
            .call("Merge", &[cell(&table, 0, 1).unwrap().into()])
            .unwrap();
        let merge = detect_merge_regions(&table, 3, 2).unwrap();
        assert_eq!(
            merge.regions,
            vec![MergeRegion { row: 0, col: 0, n_rows: 1, n_cols: 2 }]
        );
        assert!(merge.is_covered(0, 1));
        assert!(!merge.is_covered(0, 0));
    }

    #[test]
    fn test_capture_and_recreate_with_merge() {
        let shape = table_shape(3, 2);
        let table = shape.get_object("Table").unwrap();
        cell(&table, 0, 0)
            .unwrap()
            .call("Merge", &[cell(&table, 0, 1).unwrap().into()])
            .unwrap();
        set_cell_text(&table, 0, 0, "header");
        set_cell_text(&table, 2, 1, "tail");
        let model = TableApi::from_api(&table).unwrap();
        assert_eq!(model.n_rows(), 3);
        assert_eq!(model.n_cols(), 2);
        assert!(model.rows[0].cells[1].text_frame.is_none());

        let fresh = table_shape(2, 2);
        let fresh_table = fresh.get_object("Table").unwrap();
        model.apply_api(&fresh_table).unwrap();

        let captured = TableApi::from_api(&fresh_table).unwrap();
        assert_eq!(captured.merge, model.merge);
        assert_eq!(
            captured.rows[0].cells[0].text_frame.as_ref().unwrap().text_range.text(),
            "header"
        );
        assert_eq!(captured, model);
    }

    #[test]
    fn test_overlapping_regions_rejected() {
        let result = CellMergeApi::new(vec![
            MergeRegion { row: 0, col: 0, n_rows: 2, n_cols: 2 },
            MergeRegion { row: 1, col: 1, n_rows: 1, n_cols: 2 },
        ]);
        assert!(result.is_err());
    }
}
