//! `fps_ctl`: command-line entry point for the three FPS roles — `conf`
//! (recompute derived values on update), `run` (drive the live loop),
//! and `ctrl` (read commands off the FIFO and dispatch them) — plus
//! one-shot `create`/`cmd` utility subcommands for scripting.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use fps_core::argbind::{self, ArgDescriptor, ArgSchema, BindOutcome, DescriptorFlags, NoVariables, Token, TokenKind};
use fps_core::fps::{FpsSignal, FpsStatus};
use fps_core::validate::{FileChecker, FitsSniffer, FpsReachability, StreamHandle, StreamLoader, ValidatorContext};
use fps_core::CommandInterpreter;
use fps_infra::{config, conf_run, fifo, outlog, store, ui, FpsRegistry, ProcessSessionManager};

#[derive(Parser)]
#[command(name = "fps_ctl", about = "Function parameter store control utility")]
struct Cli {
    /// Shared-memory root directory; defaults to MILK_SHM_DIR or /milk/shm.
    #[arg(long, global = true)]
    shm_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new, empty FPS.
    Create { name: String },
    /// Run the conf worker loop for an existing FPS.
    Conf { name: String },
    /// Run the run-state worker loop for an existing FPS.
    Run { name: String },
    /// Read commands off the control FIFO until `exit`.
    Ctrl {
        #[arg(long, default_value = "fpscmd")]
        fifo_name: String,
    },
    /// Dispatch a single command line against the scanned FPS directory.
    Cmd { line: Vec<String> },
    /// Bind CLI-style arguments against an FPS's own parameters: either a
    /// literal sentinel (`_FPSINIT_`/`_CONFSTART_`/`_CONFSTOP_`/
    /// `_RUNSTART_`/`_RUNSTOP_`) to switch to FPS control mode, or a
    /// positional/keyword argument list committed into the FPS.
    Bind { name: String, args: Vec<String> },
}

/// Literal first-argument sentinels that switch a bound command to FPS
/// control mode instead of ordinary argument binding.
const SENTINEL_FPSINIT: &str = "_FPSINIT_";
const SENTINEL_CONFSTART: &str = "_CONFSTART_";
const SENTINEL_CONFSTOP: &str = "_CONFSTOP_";
const SENTINEL_RUNSTART: &str = "_RUNSTART_";
const SENTINEL_RUNSTOP: &str = "_RUNSTOP_";

/// Lex one raw CLI token: numeric literals parse as `Int`/`Float`, `?`/`.`
/// and everything else pass through as `StrLiteral` (this binary has no
/// declared variable namespace to resolve barewords against).
fn lex_token(raw: &str) -> Token {
    let kind = if let Ok(i) = raw.parse::<i64>() {
        TokenKind::Int(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        TokenKind::Float(f)
    } else {
        TokenKind::StrLiteral(raw.to_string())
    };
    Token::new(kind, raw)
}

/// Build an ad hoc [`ArgSchema`] from an FPS's own live parameters: this
/// binary has no per-application static schema, so every active parameter
/// becomes one positional/keyword-addressable descriptor in index order.
fn schema_from_fps(fps: &fps_core::Fps) -> ArgSchema {
    fps.active_parameters()
        .map(|(_, param)| ArgDescriptor {
            fps_tag: param.keyword_path().full().to_string(),
            description: param.description().to_string(),
            expected_kind: param.kind,
            flags: DescriptorFlags::default(),
        })
        .collect()
}

/// Disk-backed external collaborators for [`fps_core::validate::validate`],
/// used by the conf loop. Stream loading always reports "not found" here:
/// resolving real image streams lives outside this crate's scope.
struct DiskValidators;

impl FileChecker for DiskValidators {
    fn exists(&self, path: &str) -> bool {
        std::path::Path::new(path).exists()
    }
    fn is_executable(&self, path: &str) -> bool {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).map(|m| m.permissions().mode() & 0o111 != 0).unwrap_or(false)
    }
}
impl FitsSniffer for DiskValidators {
    fn looks_like_fits(&self, path: &str) -> bool {
        std::fs::read(path).map(|bytes| bytes.starts_with(b"SIMPLE")).unwrap_or(false)
    }
}
impl StreamLoader for DiskValidators {
    fn load(&self, _name: &str) -> Option<StreamHandle> {
        None
    }
}
impl FpsReachability for DiskValidators {
    fn can_connect(&self, fps_name: &str) -> bool {
        resolve_shm_dir().map(|root| store::shm_path(&root, fps_name).exists()).unwrap_or(false)
    }
}

fn resolve_shm_dir() -> anyhow::Result<PathBuf> {
    Ok(config::resolve_shm_root()?)
}

fn epoch_secs() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let root = match cli.shm_dir {
        Some(dir) => dir,
        None => config::resolve_shm_root()?,
    };

    match cli.command {
        Command::Create { name } => {
            let fps = store::create(&root, &name, root.to_str().unwrap_or_default())?;
            info!(fps = %fps.header.name(), "created fps");
        }
        Command::Conf { name } => run_conf(&root, &name)?,
        Command::Run { name } => run_run(&root, &name)?,
        Command::Ctrl { fifo_name } => run_ctrl(&root, &fifo_name)?,
        Command::Cmd { line } => {
            let cmdline = line.join(" ");
            let mut registry = FpsRegistry::load(root.clone())?;
            let sessions = ProcessSessionManager::current_exe()?;
            let interp = CommandInterpreter::new();
            let outcome = interp.dispatch(&cmdline, &mut registry, &sessions);
            registry.persist_all()?;
            if let Some(text) = outcome.output {
                println!("{text}");
            }
            info!(status = ?outcome.status, "dispatched command");
        }
        Command::Bind { name, args } => run_bind(&root, &name, &args)?,
    }

    Ok(())
}

fn run_conf(root: &PathBuf, name: &str) -> anyhow::Result<()> {
    let mut fps = store::connect(root, name)?;
    fps.header.status.insert(FpsStatus::CONF | FpsStatus::CMDCONF);
    store::persist(root, &fps)?;

    let pid = std::process::id() as i32;
    let mut log = outlog::OutLog::open(root, epoch_secs(), pid, "conf")?;
    log.log("STARTUP", &format!("conf loop starting for {name}"))?;

    let validators = DiskValidators;
    let ctx = ValidatorContext {
        files: &validators,
        fits: &validators,
        streams: &validators,
        fps_reach: &validators,
    };

    let confwaitus = config::resolve_knob(config::ConfigKnob::ConfWaitUs)?;
    let result = conf_run::conf_loop(
        &mut fps,
        &ctx,
        // Recomputing derived values is application-specific and has no
        // default here; the loop still validates and gates on CMDCONF.
        &mut |_fps| Ok(()),
        &|us| std::thread::sleep(std::time::Duration::from_micros(us)),
        confwaitus,
    );

    if let Err(e) = &result {
        error!(error = %e, "conf loop error");
    }
    fps.header.status.remove(FpsStatus::CONF);
    store::persist(root, &fps)?;
    log.log("LOGFILECLOSE", "conf loop exiting")?;
    Ok(result?)
}

fn run_run(root: &PathBuf, name: &str) -> anyhow::Result<()> {
    let mut fps = store::connect(root, name)?;
    fps.header.status.insert(FpsStatus::RUN | FpsStatus::CMDRUN);
    store::persist(root, &fps)?;

    let pid = std::process::id() as i32;
    let mut log = outlog::OutLog::open(root, epoch_secs(), pid, "run")?;
    log.log("STARTUP", &format!("run loop starting for {name}"))?;

    let runwait_poll = fps_core::limits::RUNWAIT_POLL_US;
    let result = conf_run::run_loop(
        &mut fps,
        &mut |fps| {
            fps.header.signal.insert(FpsSignal::CONFRUN);
            Ok(())
        },
        &|us| std::thread::sleep(std::time::Duration::from_micros(us)),
        runwait_poll,
    );

    if let Err(e) = &result {
        error!(error = %e, "run loop error");
    }
    fps.header.status.remove(FpsStatus::RUN);
    store::persist(root, &fps)?;
    log.log("LOGFILECLOSE", "run loop exiting")?;
    Ok(result?)
}

/// Bind one CLI invocation against `name`'s FPS: a literal sentinel first
/// argument switches to FPS control mode (create/confstart/confstop/
/// runstart/runstop); otherwise the remaining arguments are bound against
/// the FPS's own parameters and committed into it.
fn run_bind(root: &PathBuf, name: &str, args: &[String]) -> anyhow::Result<()> {
    use fps_core::FpsDirectory;

    let sentinel = args.first().map(String::as_str);
    match sentinel {
        Some(SENTINEL_FPSINIT) => {
            if store::shm_path(root, name).exists() {
                info!(fps = name, "fps already initialized");
            } else {
                let fps = store::create(root, name, root.to_str().unwrap_or_default())?;
                info!(fps = %fps.header.name(), "created fps");
            }
            return Ok(());
        }
        Some(sentinel @ (SENTINEL_CONFSTART | SENTINEL_CONFSTOP | SENTINEL_RUNSTART | SENTINEL_RUNSTOP)) => {
            let cmd = match sentinel {
                SENTINEL_CONFSTART => "confstart",
                SENTINEL_CONFSTOP => "confstop",
                SENTINEL_RUNSTART => "runstart",
                SENTINEL_RUNSTOP => "runstop",
                _ => unreachable!(),
            };
            let mut registry = FpsRegistry::load(root.clone())?;
            let sessions = ProcessSessionManager::current_exe()?;
            let interp = CommandInterpreter::new();
            let outcome = interp.dispatch(&format!("{cmd} {name}"), &mut registry, &sessions);
            registry.persist_all()?;
            info!(status = ?outcome.status, cmd, "dispatched fps control command");
            return Ok(());
        }
        _ => {}
    }

    let mut registry = FpsRegistry::load(root.clone())?;
    let fps = registry
        .get_fps_mut(name)
        .ok_or_else(|| anyhow::anyhow!("unknown fps: {name}"))?;
    let schema = schema_from_fps(&*fps);
    let tokens: Vec<Token> = args.iter().map(|a| lex_token(a)).collect();
    let mut last_values = argbind::LastValueStore::new();

    let outcome = argbind::bind(&schema, &tokens, &mut last_values, &NoVariables)?;
    match &outcome {
        BindOutcome::Help => {
            for d in &schema {
                println!("{:<24} {} ({:?})", d.fps_tag, d.description, d.expected_kind);
            }
        }
        BindOutcome::Bound(_) | BindOutcome::SingleParamSet { .. } => {
            argbind::commit(&schema, &outcome, fps)?;
            registry.persist_all()?;
        }
    }
    Ok(())
}

fn run_ctrl(root: &PathBuf, fifo_name: &str) -> anyhow::Result<()> {
    use fps_core::directive::{self, BinderState};
    use fps_core::schedule::{FpsGateStatus, Scheduler};
    use fps_core::{CommandStatus, FpsDirectory};

    let mut registry = FpsRegistry::load(root.clone())?;
    let sessions = ProcessSessionManager::current_exe()?;
    let interp = CommandInterpreter::new();
    let renderer = ui::backend_for_mode(config::resolve_ui_mode());

    let pid = std::process::id() as i32;
    let mut log = outlog::OutLog::open(root, epoch_secs(), pid, "ctrl")?;

    let fifo_path = root.join(fifo_name);
    let mut reader = fifo::FifoReader::open(&fifo_path)?;
    renderer.notify(&format!("listening on {}", fifo_path.display()));

    let mut scheduler = Scheduler::new();
    let mut binder = BinderState::default();
    let mut tick_now: u64 = 0;
    let mut exiting = false;

    loop {
        // Snapshot the name index up front: a task's `fps_index_resolved`
        // is looked up against this same ordering both at submit time and
        // at gate-check time below.
        let names: Vec<String> = {
            let mut n: Vec<String> = registry.names().map(String::from).collect();
            n.sort();
            n
        };

        match reader.try_read_line() {
            Ok(Some(line)) => {
                if line.trim() == "exit" {
                    renderer.notify("exit requested");
                    exiting = true;
                } else if let Some(directive) = directive::parse_directive(&line) {
                    binder.apply(directive, &mut scheduler);
                } else {
                    log.log("CMDRCV", &line)?;
                    let fps_index = directive::extract_fps_name(&line)
                        .and_then(|name| names.iter().position(|n| n == name));
                    scheduler.submit(line, binder.queue_id, tick_now, binder.flags, fps_index);
                }
            }
            Ok(None) => {
                std::thread::sleep(std::time::Duration::from_millis(fps_core::limits::KEYBOARD_POLL_MS));
            }
            Err(e) => {
                error!(error = %e, "fifo read error");
                break;
            }
        }

        // Snapshot gate status up front: the dispatch closure below needs
        // `&mut registry`, so it can't also hold an immutable borrow alive.
        let gate_statuses: Vec<FpsGateStatus> = names
            .iter()
            .map(|name| {
                registry
                    .get_fps(name)
                    .map(|fps| FpsGateStatus {
                        cmdrun_set: fps.header.status.contains(FpsStatus::CMDRUN),
                        checked_signal_set: fps.header.signal.contains(FpsSignal::CHECKED),
                    })
                    .unwrap_or(FpsGateStatus { cmdrun_set: false, checked_signal_set: false })
            })
            .collect();

        scheduler.tick(
            tick_now,
            |fps_idx| {
                gate_statuses
                    .get(fps_idx)
                    .copied()
                    .unwrap_or(FpsGateStatus { cmdrun_set: false, checked_signal_set: false })
            },
            |cmdstring| {
                let outcome = interp.dispatch(cmdstring, &mut registry, &sessions);
                let keyw = match outcome.status {
                    CommandStatus::Ok => "CMDOK",
                    CommandStatus::Fail => "CMDFAIL",
                    CommandStatus::NotFound => "CMDNOTFOUND",
                };
                log.log(keyw, outcome.output.as_deref().unwrap_or(cmdstring)).ok();
                if let Some(text) = &outcome.output {
                    renderer.notify(text);
                }
                if outcome.save_now {
                    if let Some(fps) = directive::extract_fps_name(cmdstring).and_then(|name| registry.get_fps(name)) {
                        if let Err(e) = store::persist(root, fps) {
                            error!(error = %e, "saveonchange persist failed");
                        }
                    }
                }
                fps_core::schedule::DispatchOutcome {
                    status: fps_core::schedule::TaskStatus {
                        ok: outcome.status == CommandStatus::Ok,
                        fail: outcome.status == CommandStatus::Fail,
                        not_found: outcome.status == CommandStatus::NotFound,
                    },
                    queue_priority_update: outcome.queue_priority_update,
                }
            },
        );
        registry.persist_all()?;
        tick_now += 1;

        if exiting {
            break;
        }
    }

    log.log("LOGFILECLOSE", "ctrl loop exiting")?;
    Ok(())
}
