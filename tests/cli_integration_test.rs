//! CLI integration tests.
//!
//! Tests cover:
//! - Settings from INI files on disk, with `--data` override
//! - Scripted interactive sessions in admin and read-only mode
//! - Delete confirmation prompt
//! - JSON and CSV export to disk
//! - Document check command helper

mod common;

use common::*;
use cotdesk::cli::{self, ExportFormat, Session};
use cotdesk::domain::gate::ViewMode;
use cotdesk::domain::sample::initial_dataset;
use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Run a scripted session and return it with everything it printed.
fn run_script(mode: ViewMode, script: &str) -> (Session, String) {
    let mut session = Session::new(initial_dataset(), mode, Box::new(MemorySink::default()));
    let mut out = Vec::new();
    session.run(Cursor::new(script.to_string()), &mut out).unwrap();
    (session, String::from_utf8(out).unwrap())
}

mod settings_loading {
    use super::*;

    #[test]
    fn reads_all_sections() {
        let ini = write_temp_ini(
            "[data]\npath = /srv/cot/data.json\n\n[export]\ndir = /srv/cot/out\n\n[gate]\ncode = letmein\n",
        );
        let settings = cli::load_settings(Some(&ini.path().to_path_buf()), None).unwrap();

        assert_eq!(settings.data_path, PathBuf::from("/srv/cot/data.json"));
        assert_eq!(settings.export_dir, PathBuf::from("/srv/cot/out"));
        assert_eq!(settings.gate.view_mode(Some("letmein")), ViewMode::Admin);
    }

    #[test]
    fn data_flag_overrides_config() {
        let ini = write_temp_ini("[data]\npath = /srv/cot/data.json\n");
        let flag = PathBuf::from("local.json");
        let settings = cli::load_settings(Some(&ini.path().to_path_buf()), Some(&flag)).unwrap();
        assert_eq!(settings.data_path, flag);
    }

    #[test]
    fn no_config_uses_defaults() {
        let settings = cli::load_settings(None, None).unwrap();
        assert_eq!(settings.data_path, PathBuf::from("data.json"));
        assert_eq!(settings.gate.view_mode(Some("mysecretcode")), ViewMode::Admin);
    }

    #[test]
    fn missing_config_file_fails() {
        let missing = PathBuf::from("/nonexistent/cotdesk.ini");
        assert!(cli::load_settings(Some(&missing), None).is_err());
    }
}

mod admin_session {
    use super::*;

    #[test]
    fn add_pair_and_record() {
        let script = "\
add-pair audjpy
new
set date=2025-01-14 longs=300 shorts=100 flip=5%
calc
save
quit
";
        let (session, out) = run_script(ViewMode::Admin, script);

        assert!(out.contains("added AUDJPY"));
        assert!(out.contains("saved "));
        assert_eq!(session.selected(), Some("AUDJPY"));
        assert!(session.draft().is_none());

        let audjpy = session.store().dataset().pair("AUDJPY").unwrap();
        assert_eq!(audjpy.data.len(), 1);
        let r = &audjpy.data[0];
        assert_eq!(r.longs, 300);
        assert_eq!(r.pct_long, 75.0);
        assert_eq!(r.net_positions, 200);
        assert_eq!(r.bias, Bias::Bullish);
        assert_eq!(r.flip, "5%");
    }

    #[test]
    fn duplicate_pair_is_reported_and_ignored() {
        let (session, out) = run_script(ViewMode::Admin, "add-pair eurusd\n");
        assert!(out.contains("error: pair already exists: EURUSD"));
        assert_eq!(session.store().dataset().len(), 10);
        assert_eq!(session.store().revision(), 0);
    }

    #[test]
    fn edit_existing_record_in_place() {
        let script = "\
select eurusd
edit 2
set flip=12% pct_long=abc
save
";
        let (session, _) = run_script(ViewMode::Admin, script);
        let eurusd = session.store().dataset().pair("EURUSD").unwrap();
        assert_eq!(eurusd.data.len(), 2);
        let r = eurusd.record("2").unwrap();
        assert_eq!(r.flip, "12%");
        assert_eq!(r.pct_long, 0.0);
        assert_eq!(r.longs, 205_050);
    }

    #[test]
    fn delete_needs_confirmation() {
        let (session, out) = run_script(ViewMode::Admin, "delete 1\nn\n");
        assert!(out.contains("Are you sure"));
        assert!(out.contains("kept 1"));
        assert_eq!(session.store().dataset().pair("EURUSD").unwrap().data.len(), 2);

        let (session, out) = run_script(ViewMode::Admin, "delete 1\ny\n");
        assert!(out.contains("deleted 1"));
        let eurusd = session.store().dataset().pair("EURUSD").unwrap();
        assert_eq!(eurusd.data.len(), 1);
        assert_eq!(eurusd.data[0].id, "2");
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let (session, out) = run_script(ViewMode::Admin, "delete nope\nyes\n");
        assert!(out.contains("no record nope in EURUSD"));
        assert_eq!(session.store().revision(), 0);
    }

    #[test]
    fn show_includes_ids_for_admin() {
        let (_, out) = run_script(ViewMode::Admin, "show GBPUSD\n");
        assert!(out.contains(" ID\n"));
        assert!(out.contains("2025-01-14"));
    }

    #[test]
    fn flip_may_contain_spaces() {
        let script = "\
new
set date=2025-01-21 flip=10% or No longs=5
save
";
        let (session, out) = run_script(ViewMode::Admin, script);
        assert!(!out.contains("expected FIELD=VALUE"));

        let eurusd = session.store().dataset().pair("EURUSD").unwrap();
        let r = &eurusd.data[0];
        assert_eq!(r.date, "2025-01-21");
        assert_eq!(r.flip, "10% or No");
        assert_eq!(r.longs, 5);
    }

    #[test]
    fn set_without_field_name_is_reported() {
        let (session, out) = run_script(ViewMode::Admin, "set hello\n");
        assert!(out.contains("expected FIELD=VALUE, got `hello`"));
        assert!(session.draft().is_none());
    }

    #[test]
    fn unknown_field_is_reported() {
        let (session, out) = run_script(ViewMode::Admin, "set volume=3\n");
        assert!(out.contains("unknown field: volume"));
        assert!(session.draft().is_some());
    }
}

mod read_only_session {
    use super::*;

    #[test]
    fn write_commands_are_refused() {
        let script = "add-pair audjpy\ndelete 1\ny\nsave\nexport\n";
        let (session, out) = run_script(ViewMode::Public, script);

        assert!(out.contains("read-only view: `add-pair`"));
        assert!(out.contains("read-only view: `delete`"));
        assert_eq!(session.store().dataset(), &initial_dataset());
    }

    #[test]
    fn viewing_works() {
        let (_, out) = run_script(ViewMode::Public, "pairs\nshow\n");
        assert!(out.contains("EURUSD"));
        assert!(out.contains("2 records"));
        assert!(!out.contains(" ID\n"));
    }

    #[test]
    fn unknown_pair_is_an_error_line() {
        let (session, out) = run_script(ViewMode::Public, "select xauusd\n");
        assert!(out.contains("error: unknown pair: xauusd"));
        assert_eq!(session.selected(), Some("EURUSD"));
    }
}

mod exporting {
    use super::*;

    #[test]
    fn json_export_into_directory() {
        let dir = TempDir::new().unwrap();
        let path = cli::export_to(&initial_dataset(), ExportFormat::Json, None, dir.path()).unwrap();
        assert!(path.ends_with("data.json"));

        let loaded = cli::check_document(&dir.path().join("data.json")).unwrap();
        assert_eq!(without_ids(&loaded), without_ids(&initial_dataset()));
    }

    #[test]
    fn csv_export_to_explicit_path() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("table.csv");
        cli::export_to(&initial_dataset(), ExportFormat::Csv, Some(&out), dir.path()).unwrap();

        let table = fs::read_to_string(out).unwrap();
        assert_eq!(table.lines().count(), 4);
        assert!(table.starts_with("pair,date"));
    }

    #[test]
    fn session_export_goes_to_sink() {
        let sink = MemorySink::default();
        let mut session = Session::new(initial_dataset(), ViewMode::Admin, Box::new(sink));
        let mut out = Vec::new();
        session
            .run(Cursor::new("add-pair chfjpy\nexport\n".to_string()), &mut out)
            .unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("exported to memory://data.json"));
    }

    #[test]
    fn check_rejects_broken_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "not json").unwrap();
        assert!(cli::check_document(&path).is_err());
    }
}

mod assignments {
    use super::*;

    #[test]
    fn words_without_equals_extend_previous_value() {
        let parsed = cli::parse_assignments("flip=10%  or No date=2025-01-21").unwrap();
        assert_eq!(
            parsed,
            vec![
                ("flip".to_string(), "10% or No".to_string()),
                ("date".to_string(), "2025-01-21".to_string()),
            ]
        );
    }

    #[test]
    fn empty_value_then_words() {
        let parsed = cli::parse_assignments("flip= No").unwrap();
        assert_eq!(parsed, vec![("flip".to_string(), "No".to_string())]);
    }

    #[test]
    fn leading_bare_word_is_an_error() {
        assert!(cli::parse_assignments("No flip=1").is_err());
        assert!(cli::parse_assignments("=5").is_err());
        assert_eq!(cli::parse_assignments("   ").unwrap(), vec![]);
    }
}

mod formatting {
    use super::*;

    #[test]
    fn table_lists_newest_first() {
        let ds = initial_dataset();
        let table = cli::format_pair_table(ds.pair("EURUSD").unwrap(), false);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2025-01-14"));
        assert!(lines[1].contains("Bullish"));
        assert!(lines[2].starts_with("2025-01-07"));
    }

    #[test]
    fn changes_are_signed_and_percentages_suffixed() {
        let ds = initial_dataset();
        let table = cli::format_pair_table(ds.pair("EURUSD").unwrap(), false);
        let newest = table.lines().nth(1).unwrap();
        assert!(newest.contains("+5400"));
        assert!(newest.contains("-2100"));
        assert!(newest.contains("64.6%"));
        assert!(newest.contains("35.4%"));
        assert!(newest.contains("+7500"));
        assert!(!newest.contains("+95150"));

        let older = table.lines().nth(2).unwrap();
        assert!(older.contains("-1200"));
        assert!(older.contains("+4500"));
        assert!(older.contains("-5700"));
    }

    #[test]
    fn zero_change_has_no_sign() {
        let mut pair = PairData::new("USDCAD");
        pair.data.push(make_record("2025-01-14", 0, 0));
        let table = cli::format_pair_table(&pair, false);
        let row = table.lines().nth(1).unwrap();
        assert!(!row.contains('+'));
        assert!(row.contains("0.0%"));
    }

    #[test]
    fn empty_pair_says_so() {
        let table = cli::format_pair_table(&PairData::new("USDCAD"), false);
        assert!(table.contains("(no records)"));
    }

    #[test]
    fn summary_has_one_line_per_pair() {
        let summary = cli::format_pair_summary(&initial_dataset());
        assert_eq!(summary.lines().count(), 10);
        assert!(summary.contains("NZDUSD"));
    }
}
