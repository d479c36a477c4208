use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::records::{CanonicalPlayerRecord, CanonicalTable, Measurement, RankedResult};
use crate::similarity::MeasurementAverage;

pub struct ExportReport {
    pub players: usize,
    pub ranked: usize,
    pub averages: usize,
}

enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    fn opt_number(value: Option<f64>) -> Self {
        value.map_or(Cell::Empty, Cell::Number)
    }

    fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Cell::Empty, |v| Cell::Text(v.to_string()))
    }
}

/// Write the canonical table, a ranking and top-K averages to an `.xlsx` file.
pub fn export_comparison(
    path: &Path,
    table: &CanonicalTable,
    ranked: &[RankedResult],
    averages: &[MeasurementAverage],
) -> Result<ExportReport> {
    let mut workbook = Workbook::new();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Ranking")?;
        write_rows(sheet, &ranking_rows(ranked))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TopAverages")?;
        write_rows(sheet, &average_rows(averages))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Players")?;
        write_rows(sheet, &player_rows(table))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;

    Ok(ExportReport {
        players: table.len(),
        ranked: ranked.len(),
        averages: averages.len(),
    })
}

fn ranking_rows(ranked: &[RankedResult]) -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![
        Cell::Text("Rank".to_string()),
        Cell::Text("Player".to_string()),
        Cell::Text("Season".to_string()),
        Cell::Text("Distance".to_string()),
    ]];
    rows.extend(ranked.iter().enumerate().map(|(idx, r)| {
        vec![
            Cell::Number((idx + 1) as f64),
            Cell::Text(r.player_name.clone()),
            Cell::Text(r.season.label().to_string()),
            Cell::Number(r.distance),
        ]
    }));
    rows
}

fn average_rows(averages: &[MeasurementAverage]) -> Vec<Vec<Cell>> {
    let mut rows = vec![vec![
        Cell::Text("Measurement".to_string()),
        Cell::Text("Mean".to_string()),
    ]];
    rows.extend(averages.iter().map(|a| {
        vec![
            Cell::Text(a.measurement.column().to_string()),
            Cell::opt_number(a.mean),
        ]
    }));
    rows
}

fn player_rows(table: &CanonicalTable) -> Vec<Vec<Cell>> {
    let mut header = vec![
        Cell::Text("PLAYER_NAME".to_string()),
        Cell::Text("Season".to_string()),
        Cell::Text("Seasons".to_string()),
        Cell::Text("POSITION".to_string()),
        Cell::Text("HEIGHT_WO_SHOES_FT_IN".to_string()),
        Cell::Text("WINGSPAN_FT_IN".to_string()),
        Cell::Text("STANDING_REACH_FT_IN".to_string()),
    ];
    header.extend(Measurement::ALL.iter().map(|m| Cell::Text(m.column().to_string())));
    header.push(Cell::Text("DRAFT_PICK".to_string()));
    header.push(Cell::Text("MINUTES_PLAYED".to_string()));

    let mut rows = vec![header];
    rows.extend(table.iter().map(player_row));
    rows
}

fn player_row(p: &CanonicalPlayerRecord) -> Vec<Cell> {
    let seasons = p
        .seasons
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ");
    let mut row = vec![
        Cell::Text(p.player_name.clone()),
        Cell::Text(p.season.label().to_string()),
        Cell::Text(seasons),
        Cell::opt_text(p.position.as_deref()),
        Cell::opt_text(p.height_wo_shoes_ft_in.as_deref()),
        Cell::opt_text(p.wingspan_ft_in.as_deref()),
        Cell::opt_text(p.standing_reach_ft_in.as_deref()),
    ];
    row.extend(Measurement::ALL.iter().map(|m| Cell::opt_number(p.measurement(*m))));
    row.push(Cell::opt_number(p.attributes.draft_pick.map(f64::from)));
    row.push(Cell::opt_number(p.attributes.minutes_played));
    row
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<Cell>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, cell) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            match cell {
                Cell::Text(value) => {
                    worksheet.write_string(r, c, value)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(r, c, *value)?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::export_comparison;
    use crate::comparison::compare;
    use crate::config::season_range;
    use crate::enrichment::RankingFilter;
    use crate::pipeline::build_canonical_table;
    use crate::records::QueryVector;
    use crate::synthetic::generate_seasons;

    #[test]
    fn writes_workbook_with_all_sheets() {
        let table = build_canonical_table(&generate_seasons(3, &season_range(2016, 2017), 25));
        let query = QueryVector::from(table.records()[0].profile);
        let comparison =
            compare(&table, &query, 6, &RankingFilter::default()).expect("ranks");

        let path = std::env::temp_dir().join(format!("combine_export_{}.xlsx", std::process::id()));
        let report = export_comparison(&path, &table, &comparison.ranked, &comparison.averages)
            .expect("export succeeds");
        assert_eq!(report.players, table.len());
        assert_eq!(report.ranked, table.len());
        assert_eq!(report.averages, 12);
        assert!(fs::metadata(&path).map(|m| m.len() > 0).unwrap_or(false));
        let _ = fs::remove_file(&path);
    }
}
