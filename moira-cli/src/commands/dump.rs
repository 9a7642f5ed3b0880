//! `moira-dumper --action dump --directory <dir>`

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use moira_api::{MoiraClient, Transport};
use moira_sync::{dump_to_dir, Category, DumpSummary};

#[derive(Tabled)]
struct TotalRow {
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "saved")]
    saved: usize,
}

pub fn run<T: Transport>(client: &MoiraClient<T>, dir: &Path) -> Result<()> {
    let summary = dump_to_dir(client, dir)
        .with_context(|| format!("dump to '{}' failed", dir.display()))?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &DumpSummary) {
    for file in &summary.files {
        let path = file.path.display();
        match file.category {
            Category::Tags => println!("Saving tags to {path}"),
            Category::Triggers => println!("Saving trigger '{}' to {path}", file.name),
            Category::Users => println!("Saving user '{}' to {path}", file.name),
        }
    }

    let rows: Vec<TotalRow> = Category::all()
        .iter()
        .map(|category| TotalRow {
            category: category.to_string(),
            saved: summary.count(*category),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", "Total saved:".bold());
    println!("{table}");
}
