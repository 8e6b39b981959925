//! Plain-text rendering of the debt list and of a debt's history.

use crate::model::Debt;
use crate::sync::Audit;
use chrono::{Local, TimeZone};
use std::fmt::Display;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Describes how a column should align its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
}

/// A header and an alignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    header: &'static str,
    alignment: Alignment,
}

impl Column {
    pub const fn left(header: &'static str) -> Self {
        Self {
            header,
            alignment: Alignment::Left,
        }
    }

    pub const fn right(header: &'static str) -> Self {
        Self {
            header,
            alignment: Alignment::Right,
        }
    }
}

/// Represents a table with column metadata and rows of data to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Widest cell per column, headers included.
    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(ix, column)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(ix))
                    .map(|cell| cell.chars().count())
                    .fold(column.header.chars().count(), usize::max)
            })
            .collect()
    }

    fn render_row(&self, cells: &[&str], widths: &[usize]) -> String {
        self.columns
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(ix, (column, &width))| {
                let cell = cells.get(ix).copied().unwrap_or("");
                match column.alignment {
                    Alignment::Left => format!("{cell:<width$}"),
                    Alignment::Right => format!("{cell:>width$}"),
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }

    /// Renders headers, a rule, and one line per row. An empty table renders `(none)` under the
    /// rule.
    pub fn render(&self) -> String {
        let widths = self.widths();
        let headers: Vec<&str> = self.columns.iter().map(|c| c.header).collect();
        let mut lines = vec![self.render_row(&headers, &widths)];
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("  "),
        );
        if self.rows.is_empty() {
            lines.push("(none)".to_string());
        }
        for row in &self.rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            lines.push(self.render_row(&cells, &widths));
        }
        lines.join("\n")
    }
}

/// The debt list: id, name, total and remaining.
pub fn debt_table(debts: &[Debt]) -> String {
    let mut table = Table::new(vec![
        Column::left("ID"),
        Column::left("Name"),
        Column::right("Total"),
        Column::right("Remaining"),
    ]);
    for debt in debts {
        table.push(vec![
            debt.id().to_string(),
            debt.name().to_string(),
            debt.total_debt().to_string(),
            debt.remaining_debt().to_string(),
        ]);
    }
    table.render()
}

/// A debt's heading, balances and history, dates shown in local time.
pub fn debt_detail(debt: &Debt) -> String {
    debt_detail_in(debt, &Local)
}

/// A debt's heading, balances and history, dates shown in `tz`.
pub fn debt_detail_in<Tz>(debt: &Debt, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut table = Table::new(vec![
        Column::left("Date"),
        Column::right("Amount"),
        Column::left("Type"),
    ]);
    for entry in debt.payments() {
        table.push(vec![
            entry.date().with_timezone(tz).format(DATE_FORMAT).to_string(),
            entry.amount().to_string(),
            entry.entry_type().label().to_string(),
        ]);
    }
    format!(
        "Repayment history for {} ({})\nTotal debt: {}\nRemaining debt: {}\n\n{}",
        debt.name(),
        debt.id(),
        debt.total_debt(),
        debt.remaining_debt(),
        table.render()
    )
}

/// One line per audited debt, followed by its violations.
pub fn audit_report(audits: &[Audit]) -> String {
    let mut lines = Vec::new();
    for audit in audits {
        if audit.is_clean() {
            lines.push(format!("ok      {} ({})", audit.name, audit.id));
        } else {
            lines.push(format!("BROKEN  {} ({})", audit.name, audit.id));
            for violation in &audit.violations {
                lines.push(format!("        - {violation}"));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger;
    use crate::model::{Amount, DebtId, NewDebt, Violation};
    use chrono::Utc;

    fn alex() -> Debt {
        NewDebt::new("Alex", Amount::from(1000)).into_debt(DebtId::new("1"))
    }

    #[test]
    fn test_debt_table() {
        let debts = vec![
            alex(),
            NewDebt::new("Maria", Amount::from(25)).into_debt(DebtId::new("22")),
        ];
        let expected = "\
ID  Name      Total  Remaining
--  -----  --------  ---------
1   Alex   1,000.00   1,000.00
22  Maria     25.00      25.00";
        assert_eq!(debt_table(&debts), expected);
    }

    #[test]
    fn test_empty_table() {
        let expected = "\
ID  Name  Total  Remaining
--  ----  -----  ---------
(none)";
        assert_eq!(debt_table(&[]), expected);
    }

    #[test]
    fn test_debt_detail() {
        let date = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        let paid = ledger::record_payment_at(&alex(), Amount::from(300), date).unwrap();
        let debt = ledger::record_increase_at(&paid, Amount::from(200), date).unwrap();
        let expected = "\
Repayment history for Alex (1)
Total debt: 1,200.00
Remaining debt: 900.00

Date                 Amount  Type
-------------------  ------  --------
2024-02-03 04:05:06  300.00  Payment
2024-02-03 04:05:06  200.00  Increase";
        assert_eq!(debt_detail_in(&debt, &Utc), expected);
    }

    #[test]
    fn test_audit_report() {
        let audits = vec![
            Audit {
                id: DebtId::new("1"),
                name: "Alex".to_string(),
                violations: Vec::new(),
            },
            Audit {
                id: DebtId::new("2"),
                name: "Bad".to_string(),
                violations: vec![Violation::EmptyName],
            },
        ];
        let report = audit_report(&audits);
        assert!(report.starts_with("ok      Alex (1)"));
        assert!(report.contains("BROKEN  Bad (2)"));
        assert!(report.contains("- the name is empty"));
    }
}
