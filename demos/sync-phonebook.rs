//! Synchronizes two phonebooks given as `name;number` lines in two files, printing what changed.
//!
//! Usage: sync-phonebook SOURCE DESTINATION [--indexed] [--dry-run]
use gsmkit::store::{PhonebookEntry, SortOrder, SortedStore};
use gsmkit::sync::{self, SyncOptions};
use gsmkit::GsmResult;
use std::fs;

fn read_phonebook(path: &str) -> GsmResult<Vec<PhonebookEntry>> {
    let data = fs::read_to_string(path)?;
    Ok(data.lines()
        .filter(|l| !l.trim().is_empty())
        .enumerate()
        .map(|(i, l)| {
            let mut parts = l.splitn(2, ';');
            let text = parts.next().unwrap_or("").trim();
            let tel = parts.next().unwrap_or("").trim();
            PhonebookEntry::at(i as u32 + 1, text, tel)
        })
        .collect())
}

fn run() -> GsmResult<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let files = args.iter().filter(|a| !a.starts_with("--")).collect::<Vec<_>>();
    if files.len() != 2 {
        eprintln!("usage: sync-phonebook SOURCE DESTINATION [--indexed] [--dry-run]");
        std::process::exit(2);
    }
    let opts = SyncOptions {
        indexed: args.iter().any(|a| a == "--indexed"),
        dry_run: args.iter().any(|a| a == "--dry-run")
    };
    let mut source = SortedStore::from_entries(read_phonebook(files[0])?, SortOrder::ByIndex)?;
    let mut dest = SortedStore::from_entries(read_phonebook(files[1])?, SortOrder::ByIndex)?;
    let report = sync::synchronize(&mut source, &mut dest, opts)?;
    for change in report.changes.iter() {
        println!("{}", change);
    }
    println!("{} updated, {} deleted, {} inserted{}",
             report.updated(), report.deleted(), report.inserted(),
             if report.dry_run { " (dry run)" } else { "" });
    if !opts.dry_run {
        dest.set_sort_order(SortOrder::ByIndex)?;
        let out = dest.iter()
            .map(|e| format!("{};{}\n", e.text, e.telephone))
            .collect::<String>();
        fs::write(files[1], out)?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("sync-phonebook: {}", e);
        std::process::exit(1);
    }
}
