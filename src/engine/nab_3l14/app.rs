use std::cell::Cell;
use std::fmt::Debug;
use std::io::Read;
use std::panic::{catch_unwind, AssertUnwindSafe, PanicHookInfo};
use std::process::ExitCode;
use std::sync::atomic::{AtomicI32, Ordering};
use crate::utils::join_display;

// engine crates that log at the verbose level, everything else is held to warnings
const ENGINE_LOG_MODULES: &[&str] = &
[
    "nab_3l14",
    "scene_3l14",
];

pub trait CliArgs: clap::Parser + Debug { }
impl<T: clap::Parser + Debug> CliArgs for T { }

// the crate a type was declared in
fn crate_name<T>() -> &'static str
{
    let name = std::any::type_name::<T>();
    name.split("::").next().unwrap_or(name)
}

fn init_logging(app_crate: &'static str)
{
    #[cfg(debug_assertions)]
    let (default_level, engine_level) = (log::LevelFilter::Warn, log::LevelFilter::Debug);
    #[cfg(not(debug_assertions))]
    let (default_level, engine_level) = (log::LevelFilter::Warn, log::LevelFilter::Info);

    let mut builder = colog::basic_builder();
    builder.filter_level(default_level);
    builder.filter_module(app_crate, engine_level);
    for module in ENGINE_LOG_MODULES
    {
        builder.filter_module(module, engine_level);
    }
    builder.parse_default_env();

    // tests may have installed a logger already
    if let Err(err) = builder.try_init()
    {
        eprintln!("Logging was already initialized: {err}");
    }
}

#[derive(Debug)]
pub struct AppRun<TCliArgs: CliArgs>
{
    pub app_name: &'static str,
    pub version_str: &'static str,

    pub start_time: chrono::DateTime<chrono::Local>,
    pub args: TCliArgs,
    pub pid: u32,
    pub is_elevated: bool,

    exit_reason: AtomicI32,
}
impl<TCliArgs: CliArgs> AppRun<TCliArgs>
{
    pub fn startup(app_name: &'static str, app_version: &'static str) -> Self
    {
        let app_crate = crate_name::<TCliArgs>();
        init_logging(app_crate);

        let app_run = Self
        {
            app_name,
            version_str: app_version,
            start_time: chrono::Local::now(),
            args: TCliArgs::parse(),
            pid: std::process::id(),
            #[cfg(not(target_family="wasm"))]
            is_elevated: is_root::is_root(),
            #[cfg(target_family="wasm")]
            is_elevated: false,
            exit_reason: AtomicI32::new(ExitReason::NormalExit as i32),
        };

        log::info!(target: app_crate,
            "=== Starting {} v{} [{}] (PID {}){} at {} ===",
            app_run.app_name,
            app_run.version_str,
            join_display(" ", std::env::args()),
            app_run.pid,
            if app_run.is_elevated { " elevated" } else { "" },
            app_run.start_time);
        log::debug!(target: app_crate, "{:?}", app_run.args);

        app_run
    }

    pub fn set_exit_reason(&self, exit_reason: ExitReason)
    {
        self.exit_reason.store(exit_reason as i32, Ordering::SeqCst);
    }
    pub fn get_exit_reason(&self) -> ExitReason
    {
        ExitReason::from_code(self.exit_reason.load(Ordering::SeqCst))
    }
}
impl<TCliArgs: CliArgs> Drop for AppRun<TCliArgs>
{
    fn drop(&mut self)
    {
        log::info!(target: "app",
            "Exiting {} (PID {}) at {} with reason {:?}",
            self.app_name,
            self.pid,
            chrono::Local::now(),
            self.get_exit_reason());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitReason
{
    Unset = !1, // this should never be set
    NormalExit = 0,
    Failure = 1,
    Panic = -99,
}
impl ExitReason
{
    fn from_code(code: i32) -> Self
    {
        match code
        {
            0 => Self::NormalExit,
            1 => Self::Failure,
            -99 => Self::Panic,
            _ => Self::Unset,
        }
    }
}
impl std::process::Termination for ExitReason
{
    fn report(self) -> ExitCode
    {
        (self as u8).into()
    }
}

struct PanicMessage<'p>(&'p PanicHookInfo<'p>);
impl Debug for PanicMessage<'_>
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result
    {
        if let Some(payload_str) = self.0.payload().downcast_ref::<&str>()
        {
            f.write_fmt(format_args!("{payload_str}\n"))?;
        }
        else if let Some(payload_str) = self.0.payload().downcast_ref::<String>()
        {
            f.write_fmt(format_args!("{payload_str}\n"))?;
        }

        if let Some(location) = self.0.location()
        {
            Debug::fmt(&location, f)?
        }

        Ok(())
    }
}

thread_local!
{
    // nesting depth of contain_panics() on this thread
    static CONTAINING_PANICS: Cell<u32> = const { Cell::new(0) };
}

#[must_use]
pub fn is_containing_panics() -> bool
{
    CONTAINING_PANICS.with(|depth| depth.get() > 0)
}

/// Run `f`, catching any panic it raises. The panic hook reports contained panics but does not exit
pub fn contain_panics<R>(f: impl FnOnce() -> R) -> std::thread::Result<R>
{
    struct Containing;
    impl Drop for Containing
    {
        fn drop(&mut self) { CONTAINING_PANICS.with(|depth| depth.set(depth.get() - 1)); }
    }

    CONTAINING_PANICS.with(|depth| depth.set(depth.get() + 1));
    let _containing = Containing;
    catch_unwind(AssertUnwindSafe(f))
}

// The message of a caught panic payload
#[must_use]
pub fn panic_message(panic: &(dyn std::any::Any + Send)) -> String
{
    if let Some(message) = panic.downcast_ref::<&str>()
    {
        message.to_string()
    }
    else if let Some(message) = panic.downcast_ref::<String>()
    {
        message.clone()
    }
    else
    {
        "(unknown panic payload)".to_string()
    }
}

// Exit the process on any panic that reaches the hook, optionally waiting on stdin first.
// Panics raised inside contain_panics() are only logged
pub fn set_panic_hook(wait_for_exit: bool)
{
    let default_panic_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic|
    {
        if is_containing_panics()
        {
            log::error!("Contained panic: {:?}", PanicMessage(panic));
            return;
        }

        default_panic_hook(panic);

        if wait_for_exit
        {
            print!("Press any key to exit... ");
            let mut input = [0u8];
            let _ = std::io::stdin().read(&mut input);
        }

        eprintln!("!!! FATAL: {:?}", PanicMessage(panic));
        eprintln!("Exiting (PID {}) at {} with reason {:?}",
                  std::process::id(),
                  chrono::Local::now(),
                  ExitReason::Panic);

        std::process::exit(ExitReason::Panic as i32)
    }));
}
