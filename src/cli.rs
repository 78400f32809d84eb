//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_file_adapter::{DirectoryExportSink, FileExportSink, JsonFileSource};
use crate::domain::calculator;
use crate::domain::error::CotError;
use crate::domain::export::{self as exporter, EXPORT_FILENAME};
use crate::domain::form::{RecordForm, FORM_FIELDS};
use crate::domain::gate::ViewMode;
use crate::domain::loader::load_dataset;
use crate::domain::record::{Dataset, PairData};
use crate::domain::settings::Settings;
use crate::domain::store::{normalize_pair, Store};
use crate::ports::export_port::ExportSink;

#[derive(Parser, Debug)]
#[command(name = "cotdesk", about = "Weekly COT positioning viewer and editor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Interchange document (data.json)
    Json,
    /// Flat table, one row per record
    Csv,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the records of one pair, or a summary of all pairs
    Show {
        #[arg(long)]
        pair: Option<String>,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// List pairs with record counts
    Pairs {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Suggest percentages, net position and bias from longs/shorts
    Calc {
        #[arg(long)]
        longs: u64,
        #[arg(long)]
        shorts: u64,
    },
    /// Check that a data document loads without falling back
    Check {
        path: PathBuf,
    },
    /// Load the dataset and write it back out
    Export {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
    },
    /// Interactive session; editing requires the admin code
    Session {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        auth: Option<String>,
    },
    /// Start the web server
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Show { pair, config, data } => {
            run_show(pair.as_deref(), config.as_ref(), data.as_ref())
        }
        Command::Pairs { config, data } => run_pairs(config.as_ref(), data.as_ref()),
        Command::Calc { longs, shorts } => run_calc(longs, shorts),
        Command::Check { path } => run_check(&path),
        Command::Export {
            config,
            data,
            output,
            format,
        } => run_export(config.as_ref(), data.as_ref(), output.as_ref(), format),
        Command::Session { config, data, auth } => {
            run_session(config.as_ref(), data.as_ref(), auth.as_deref())
        }
        Command::Serve { config, data } => run_serve(config.as_ref(), data.as_ref()),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Settings from the optional config file, with `--data` taking precedence.
pub fn load_settings(
    config_path: Option<&PathBuf>,
    data_override: Option<&PathBuf>,
) -> Result<Settings, ExitCode> {
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            load_config(path)?
        }
        None => FileConfigAdapter::empty(),
    };

    let mut settings = Settings::from_port(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    if let Some(data) = data_override {
        settings.data_path = data.clone();
    }
    Ok(settings)
}

fn load_from(settings: &Settings) -> Dataset {
    let source = JsonFileSource::new(settings.data_path.clone());
    load_dataset(&source)
}

/// Week-over-week change with an explicit `+` when positive.
fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{value}")
    } else {
        value.to_string()
    }
}

fn percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Records of one pair as an aligned text table, newest first.
pub fn format_pair_table(pair: &PairData, with_ids: bool) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "{:<10} {:>9} {:>9} {:>8} {:>8} {:>7} {:>7} {:>9} {:>8} {:<8} {:<8}",
        "DATE", "LONGS", "SHORTS", "CHG L", "CHG S", "%L", "%S", "NET", "NET CHG", "BIAS", "FLIP"
    );
    if with_ids {
        out.push_str(" ID");
    }
    out.push('\n');

    for r in &pair.data {
        let _ = write!(
            out,
            "{:<10} {:>9} {:>9} {:>8} {:>8} {:>7} {:>7} {:>9} {:>8} {:<8} {:<8}",
            r.date,
            r.longs,
            r.shorts,
            signed(r.change_long),
            signed(r.change_short),
            percent(r.pct_long),
            percent(r.pct_short),
            r.net_positions,
            signed(r.net_change),
            r.bias,
            r.flip
        );
        if with_ids {
            let _ = write!(out, " {}", r.id);
        }
        out.push('\n');
    }

    if pair.data.is_empty() {
        out.push_str("(no records)\n");
    }
    out
}

/// One line per pair: name, record count, latest date.
pub fn format_pair_summary(dataset: &Dataset) -> String {
    let mut out = String::new();
    for p in dataset.pairs() {
        let latest = p.data.first().map(|r| r.date.as_str()).unwrap_or("-");
        let _ = writeln!(out, "{:<8} {:>4} records  latest {}", p.pair, p.data.len(), latest);
    }
    out
}

fn run_show(pair: Option<&str>, config_path: Option<&PathBuf>, data: Option<&PathBuf>) -> ExitCode {
    let settings = match load_settings(config_path, data) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let dataset = load_from(&settings);

    match pair {
        Some(name) => match find_pair(&dataset, name) {
            Some(p) => {
                println!("{}", p.pair);
                print!("{}", format_pair_table(p, false));
                ExitCode::SUCCESS
            }
            None => {
                let err = CotError::UnknownPair {
                    pair: name.to_string(),
                };
                eprintln!("error: {err}");
                (&err).into()
            }
        },
        None => {
            print!("{}", format_pair_summary(&dataset));
            ExitCode::SUCCESS
        }
    }
}

fn run_pairs(config_path: Option<&PathBuf>, data: Option<&PathBuf>) -> ExitCode {
    let settings = match load_settings(config_path, data) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let dataset = load_from(&settings);
    for p in dataset.pairs() {
        println!("{}\t{}", p.pair, p.data.len());
    }
    eprintln!("{} pairs", dataset.len());
    ExitCode::SUCCESS
}

fn run_calc(longs: u64, shorts: u64) -> ExitCode {
    let d = calculator::calculate(longs, shorts);
    println!("pct_long:      {:.1}", d.pct_long);
    println!("pct_short:     {:.1}", d.pct_short);
    println!("net_positions: {}", d.net_positions);
    println!("bias:          {}", d.bias);
    ExitCode::SUCCESS
}

/// Write the dataset in `format` to `output`, or into the configured export
/// directory under the format's fixed filename.
pub fn export_to(
    dataset: &Dataset,
    format: ExportFormat,
    output: Option<&PathBuf>,
    export_dir: &Path,
) -> Result<String, CotError> {
    let sink: Box<dyn ExportSink> = match output {
        Some(path) => Box::new(FileExportSink::new(path.clone())),
        None => Box::new(DirectoryExportSink::new(export_dir.to_path_buf())),
    };

    match format {
        ExportFormat::Json => exporter::export_dataset(dataset, sink.as_ref()),
        ExportFormat::Csv => {
            let table = csv_adapter::to_csv_string(dataset)?;
            sink.deliver(csv_adapter::CSV_FILENAME, &table)
        }
    }
}

fn run_export(
    config_path: Option<&PathBuf>,
    data: Option<&PathBuf>,
    output: Option<&PathBuf>,
    format: ExportFormat,
) -> ExitCode {
    let settings = match load_settings(config_path, data) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let dataset = load_from(&settings);

    match export_to(&dataset, format, output, &settings.export_dir) {
        Ok(path) => {
            eprintln!(
                "Exported {} pairs ({} records) to {}",
                dataset.len(),
                dataset.record_count(),
                path
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Exact match first, then the uppercased form.
fn find_pair<'a>(dataset: &'a Dataset, name: &str) -> Option<&'a PairData> {
    dataset
        .pair(name)
        .or_else(|| dataset.pair(&normalize_pair(name)))
}

/// Split `a=1 b=two words` into `[(a, "1"), (b, "two words")]`. Words without
/// `=` continue the previous value, so free-text fields may contain spaces.
pub fn parse_assignments(rest: &str) -> Result<Vec<(String, String)>, String> {
    let mut assignments: Vec<(String, String)> = Vec::new();
    for word in rest.split_whitespace() {
        match word.split_once('=') {
            Some((field, value)) if !field.is_empty() => {
                assignments.push((field.to_string(), value.to_string()));
            }
            _ => match assignments.last_mut() {
                Some((_, value)) => {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(word);
                }
                None => return Err(format!("expected FIELD=VALUE, got `{word}`")),
            },
        }
    }
    Ok(assignments)
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

const SESSION_HELP: &str = "\
commands:
  pairs                   list pairs
  select PAIR             make PAIR the active pair
  show [PAIR]             show records of the active pair (or PAIR)
  add-pair NAME           add an empty pair                     [admin]
  new                     start a draft for a new record        [admin]
  edit ID                 start a draft from an existing record [admin]
  set FIELD=VALUE ...     change draft fields                   [admin]
  calc                    fill %, net and bias from longs/shorts [admin]
  draft                   show the current draft
  save                    save the draft into the active pair   [admin]
  cancel                  discard the draft
  delete ID               delete a record (asks to confirm)     [admin]
  export [PATH]           write data.json                       [admin]
  help                    this text
  quit                    leave (unsaved changes are lost unless exported)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Quit,
}

/// One interactive session: owns the store for its whole lifetime.
pub struct Session {
    store: Store,
    mode: ViewMode,
    selected: Option<String>,
    draft: Option<RecordForm>,
    sink: Box<dyn ExportSink>,
}

impl Session {
    pub fn new(dataset: Dataset, mode: ViewMode, sink: Box<dyn ExportSink>) -> Self {
        let selected = dataset.pairs().first().map(|p| p.pair.clone());
        Self {
            store: Store::new(dataset),
            mode,
            selected,
            draft: None,
            sink,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn draft(&self) -> Option<&RecordForm> {
        self.draft.as_ref()
    }

    /// Read commands from `input` until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        let mode = match self.mode {
            ViewMode::Admin => "admin",
            ViewMode::Public => "read-only",
        };
        writeln!(out, "cotdesk session ({mode}); type `help` for commands")?;

        let mut lines = input.lines();
        loop {
            write!(out, "{}> ", self.selected.as_deref().unwrap_or("-"))?;
            out.flush()?;
            let line = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            if self.execute(&line, &mut lines, out)? == Step::Quit {
                break;
            }
        }
        Ok(())
    }

    /// Run one command line. Further lines are only consumed to answer a
    /// confirmation prompt.
    pub fn execute<I, W>(&mut self, line: &str, lines: &mut I, out: &mut W) -> io::Result<Step>
    where
        I: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        let mut parts = line.split_whitespace();
        let Some(cmd) = parts.next() else {
            return Ok(Step::Continue);
        };
        let args: Vec<&str> = parts.collect();

        let result = match cmd {
            "help" => writeln!(out, "{SESSION_HELP}").map_err(CotError::from),
            "quit" | "exit" => return Ok(Step::Quit),
            "pairs" => write!(out, "{}", format_pair_summary(self.store.dataset()))
                .map_err(CotError::from),
            "select" => self.cmd_select(&args, out),
            "show" => self.cmd_show(&args, out),
            "draft" => self.cmd_draft(out),
            "cancel" => {
                self.draft = None;
                Ok(())
            }
            "add-pair" | "new" | "edit" | "set" | "calc" | "save" | "delete" | "export"
                if !self.mode.can_edit() =>
            {
                writeln!(out, "read-only view: `{cmd}` needs the admin code (--auth)")
                    .map_err(CotError::from)
            }
            "add-pair" => self.cmd_add_pair(&args, out),
            "new" => {
                self.draft = Some(RecordForm::blank(&today()));
                self.cmd_draft(out)
            }
            "edit" => self.cmd_edit(&args, out),
            "set" => self.cmd_set(line.trim_start()[cmd.len()..].trim(), out),
            "calc" => self.cmd_calc(out),
            "save" => self.cmd_save(out),
            "delete" => self.cmd_delete(&args, lines, out),
            "export" => self.cmd_export(&args, out),
            other => writeln!(out, "unknown command `{other}`; try `help`").map_err(CotError::from),
        };

        match result {
            Ok(()) => Ok(Step::Continue),
            Err(CotError::Io(e)) => Err(e),
            Err(e) => {
                writeln!(out, "error: {e}")?;
                Ok(Step::Continue)
            }
        }
    }

    fn active_pair(&self) -> Result<&str, CotError> {
        self.selected.as_deref().ok_or_else(|| CotError::UnknownPair {
            pair: "(none selected)".into(),
        })
    }

    fn resolve_pair(&self, name: &str) -> Result<String, CotError> {
        find_pair(self.store.dataset(), name)
            .map(|p| p.pair.clone())
            .ok_or_else(|| CotError::UnknownPair {
                pair: name.to_string(),
            })
    }

    fn cmd_select<W: Write>(&mut self, args: &[&str], out: &mut W) -> Result<(), CotError> {
        let Some(name) = args.first() else {
            writeln!(out, "usage: select PAIR")?;
            return Ok(());
        };
        self.selected = Some(self.resolve_pair(name)?);
        Ok(())
    }

    fn cmd_show<W: Write>(&self, args: &[&str], out: &mut W) -> Result<(), CotError> {
        let name = match args.first() {
            Some(name) => self.resolve_pair(name)?,
            None => self.active_pair()?.to_string(),
        };
        let pair = self
            .store
            .dataset()
            .pair(&name)
            .ok_or(CotError::UnknownPair { pair: name.clone() })?;
        writeln!(out, "{}", pair.pair)?;
        write!(out, "{}", format_pair_table(pair, self.mode.can_edit()))?;
        Ok(())
    }

    fn cmd_draft<W: Write>(&self, out: &mut W) -> Result<(), CotError> {
        match &self.draft {
            Some(form) => {
                for field in FORM_FIELDS {
                    let value = match field {
                        "id" => &form.id,
                        "date" => &form.date,
                        "longs" => &form.longs,
                        "shorts" => &form.shorts,
                        "change_long" => &form.change_long,
                        "change_short" => &form.change_short,
                        "pct_long" => &form.pct_long,
                        "pct_short" => &form.pct_short,
                        "net_positions" => &form.net_positions,
                        "net_change" => &form.net_change,
                        "bias" => &form.bias,
                        _ => &form.flip,
                    };
                    writeln!(out, "  {field:<14} {value}")?;
                }
            }
            None => writeln!(out, "no draft; use `new` or `edit ID`")?,
        }
        Ok(())
    }

    fn cmd_add_pair<W: Write>(&mut self, args: &[&str], out: &mut W) -> Result<(), CotError> {
        let Some(name) = args.first() else {
            writeln!(out, "usage: add-pair NAME")?;
            return Ok(());
        };
        let pair = self.store.add_pair(name)?;
        writeln!(out, "added {pair}")?;
        self.selected = Some(pair);
        Ok(())
    }

    fn cmd_edit<W: Write>(&mut self, args: &[&str], out: &mut W) -> Result<(), CotError> {
        let Some(id) = args.first() else {
            writeln!(out, "usage: edit ID")?;
            return Ok(());
        };
        let pair = self.active_pair()?;
        let record = self
            .store
            .dataset()
            .pair(pair)
            .and_then(|p| p.record(id))
            .map(RecordForm::from);
        match record {
            Some(form) => {
                self.draft = Some(form);
                self.cmd_draft(out)
            }
            None => {
                writeln!(out, "no record {id} in {pair}")?;
                Ok(())
            }
        }
    }

    fn cmd_set<W: Write>(&mut self, rest: &str, out: &mut W) -> Result<(), CotError> {
        let assignments = match parse_assignments(rest) {
            Ok(a) if !a.is_empty() => a,
            Ok(_) => {
                writeln!(out, "usage: set FIELD=VALUE ...")?;
                return Ok(());
            }
            Err(reason) => {
                writeln!(out, "{reason}")?;
                return Ok(());
            }
        };
        let draft = self
            .draft
            .get_or_insert_with(|| RecordForm::blank(&today()));
        for (field, value) in assignments {
            if let Err(reason) = draft.set_field(&field, &value) {
                writeln!(out, "{reason}")?;
            }
        }
        Ok(())
    }

    fn cmd_calc<W: Write>(&mut self, out: &mut W) -> Result<(), CotError> {
        match self.draft.as_mut() {
            Some(form) => {
                form.auto_calculate();
                self.cmd_draft(out)
            }
            None => {
                writeln!(out, "no draft; use `new` or `edit ID`")?;
                Ok(())
            }
        }
    }

    fn cmd_save<W: Write>(&mut self, out: &mut W) -> Result<(), CotError> {
        let Some(form) = self.draft.as_ref() else {
            writeln!(out, "no draft to save")?;
            return Ok(());
        };
        let pair = self.active_pair()?.to_string();
        let id = self.store.upsert_record(&pair, form.to_record())?;
        self.draft = None;
        writeln!(out, "saved {id} in {pair}")?;
        Ok(())
    }

    fn cmd_delete<I, W>(&mut self, args: &[&str], lines: &mut I, out: &mut W) -> Result<(), CotError>
    where
        I: Iterator<Item = io::Result<String>>,
        W: Write,
    {
        let Some(id) = args.first() else {
            writeln!(out, "usage: delete ID")?;
            return Ok(());
        };
        let pair = self.active_pair()?.to_string();

        write!(out, "Are you sure you want to delete record {id} from {pair}? [y/N] ")?;
        out.flush()?;
        let answer = lines.next().transpose()?.unwrap_or_default();
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            writeln!(out, "kept {id}")?;
            return Ok(());
        }

        if self.store.delete_record(&pair, id)? {
            writeln!(out, "deleted {id}")?;
        } else {
            writeln!(out, "no record {id} in {pair}")?;
        }
        Ok(())
    }

    fn cmd_export<W: Write>(&mut self, args: &[&str], out: &mut W) -> Result<(), CotError> {
        let delivered = match args.first() {
            Some(path) => {
                exporter::export_dataset(self.store.dataset(), &FileExportSink::new(PathBuf::from(path)))?
            }
            None => exporter::export_dataset(self.store.dataset(), self.sink.as_ref())?,
        };
        writeln!(out, "exported to {delivered}")?;
        Ok(())
    }
}

fn run_session(
    config_path: Option<&PathBuf>,
    data: Option<&PathBuf>,
    auth: Option<&str>,
) -> ExitCode {
    let settings = match load_settings(config_path, data) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let mode = settings.gate.view_mode(auth);
    if auth.is_some() && mode == ViewMode::Public {
        eprintln!("warning: auth code not accepted; starting read-only");
    }

    let dataset = load_from(&settings);
    let sink = Box::new(DirectoryExportSink::new(settings.export_dir.clone()));
    let mut session = Session::new(dataset, mode, sink);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    match session.run(stdin.lock(), &mut stdout) {
        Ok(()) => {
            if session.store().revision() > 0 {
                eprintln!(
                    "note: {} change(s) made this session; only exported data ({}) is kept",
                    session.store().revision(),
                    EXPORT_FILENAME
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let err = CotError::from(e);
            eprintln!("error: {err}");
            (&err).into()
        }
    }
}

fn run_serve(config_path: Option<&PathBuf>, data: Option<&PathBuf>) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};
        use std::net::SocketAddr;

        let settings = match load_settings(config_path, data) {
            Ok(s) => s,
            Err(code) => return code,
        };

        let addr: SocketAddr = match settings.listen.parse() {
            Ok(a) => a,
            Err(e) => {
                let err = CotError::ConfigInvalid {
                    section: "web".into(),
                    key: "listen".into(),
                    reason: format!("{e}"),
                };
                eprintln!("error: {err}");
                return (&err).into();
            }
        };

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                eprintln!("error: failed to start runtime: {e}");
                return ExitCode::from(1);
            }
        };

        let result: io::Result<()> = runtime.block_on(async {
            let dataset = load_from(&settings);
            let router = build_router(AppState::new(dataset, settings.gate.clone()));
            let listener = tokio::net::TcpListener::bind(addr).await?;
            eprintln!("Starting web server on {}", addr);
            axum::serve(listener, router).await
        });

        match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let err = CotError::from(e);
                eprintln!("error: {err}");
                (&err).into()
            }
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = (config_path, data);
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}

fn run_check(path: &Path) -> ExitCode {
    eprintln!("Checking {}", path.display());
    match check_document(path) {
        Ok(dataset) => {
            print!("{}", format_pair_summary(&dataset));
            eprintln!(
                "Document is valid: {} pairs, {} records",
                dataset.len(),
                dataset.record_count()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("the built-in sample data would be used instead");
            (&e).into()
        }
    }
}

/// Read a document from disk and report whether it would load as-is.
pub fn check_document(path: &Path) -> Result<Dataset, CotError> {
    let body = fs::read_to_string(path)?;
    crate::domain::loader::parse_document(&body).map_err(|reason| CotError::Load {
        location: path.display().to_string(),
        reason,
    })
}
