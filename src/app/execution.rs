//! Script execution against a live toaster

use anyhow::{Context, Result};
use log::{debug, error, info};
use parking_lot::Mutex;
use std::io::{self, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::cli::{self, ScriptCommand, ScriptError, ScriptLine, ToastRef};
use crate::config;
use crate::display::SnapshotRenderer;
use crate::notifications::{
    NotificationId, NotificationState, Observer, SequentialIdGenerator, StoreConfig, ToastHandle, Toaster,
};

/// Observer that renders every snapshot it receives to a writer
pub struct SnapshotPrinter<W: Write + Send> {
    renderer: SnapshotRenderer,
    sequence: AtomicUsize,
    out: Mutex<W>,
}

impl<W: Write + Send> SnapshotPrinter<W> {
    pub fn new(renderer: SnapshotRenderer, out: W) -> Self {
        Self {
            renderer,
            sequence: AtomicUsize::new(0),
            out: Mutex::new(out),
        }
    }

    /// Number of snapshots delivered so far
    pub fn delivered(&self) -> usize {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Print `state` under the latest sequence number without counting it as a delivery
    pub fn show(&self, state: &NotificationState) {
        self.write(self.delivered(), state);
    }

    fn write(&self, sequence: usize, state: &NotificationState) {
        match self.renderer.render(sequence, state) {
            Ok(rendered) => {
                if let Err(e) = writeln!(self.out.lock(), "{}", rendered) {
                    error!("Failed to write snapshot {}: {}", sequence, e);
                }
            }
            Err(e) => error!("Failed to render snapshot {}: {}", sequence, e),
        }
    }
}

impl<W: Write + Send> Observer for SnapshotPrinter<W> {
    fn on_change(&self, state: &Arc<NotificationState>) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.write(sequence, state);
    }
}

/// Replays parsed script commands and tracks the toasts they enqueue
pub struct ScriptSession {
    toaster: Toaster,
    enqueued: Vec<ToastHandle>,
    shut_down: bool,
}

impl ScriptSession {
    pub fn new(toaster: Toaster) -> Self {
        Self {
            toaster,
            enqueued: Vec::new(),
            shut_down: false,
        }
    }

    pub fn toaster(&self) -> &Toaster {
        &self.toaster
    }

    /// Handles in enqueue order; `@N` refers to `enqueued()[N - 1]`
    pub fn enqueued(&self) -> &[ToastHandle] {
        &self.enqueued
    }

    fn resolve(&self, target: &ToastRef) -> Result<NotificationId, ScriptError> {
        match target {
            ToastRef::Index(index) => index
                .checked_sub(1)
                .and_then(|position| self.enqueued.get(position))
                .map(|handle| handle.id().clone())
                .ok_or_else(|| ScriptError::UnknownToastRef {
                    reference: target.to_string(),
                }),
            ToastRef::Id(id) => Ok(id.clone()),
        }
    }

    /// Execute one command; `show` output goes through `printer`
    pub async fn execute<W: Write + Send>(
        &mut self,
        line: &ScriptLine,
        printer: &SnapshotPrinter<W>,
    ) -> Result<(), ScriptError> {
        debug!("Line {}: {:?}", line.line, line.command);

        match &line.command {
            ScriptCommand::Enqueue(payload) => {
                let handle = self.toaster.enqueue(payload.clone());
                info!("Enqueued @{} as '{}'", self.enqueued.len() + 1, handle.id());
                self.enqueued.push(handle);
            }
            ScriptCommand::Update { target, update } => {
                let mut update = update.clone();
                update.id = self.resolve(target)?;
                self.toaster.update(update);
            }
            ScriptCommand::Dismiss(None) => self.toaster.dismiss_all(),
            ScriptCommand::Dismiss(Some(target)) => {
                let id = self.resolve(target)?;
                self.toaster.dismiss(Some(&id));
            }
            ScriptCommand::RemoveWait => {
                debug!("Waiting for {} pending removals", self.toaster.pending_removals());
                self.toaster.settle().await;
            }
            ScriptCommand::Wait(duration) => tokio::time::sleep(*duration).await,
            ScriptCommand::Show => printer.show(&self.toaster.state()),
            ScriptCommand::Shutdown => self.shutdown(),
        }

        Ok(())
    }

    /// Execute every command, then tear the store down
    pub async fn run<W: Write + Send>(
        &mut self,
        commands: &[ScriptLine],
        printer: &SnapshotPrinter<W>,
    ) -> Result<(), ScriptError> {
        for line in commands {
            self.execute(line, printer).await?;
        }
        self.shutdown();
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.shut_down {
            self.toaster.shutdown();
            self.shut_down = true;
        }
    }
}

/// Build a toaster on the current runtime
pub fn build_toaster(store_config: StoreConfig, sequential_ids: bool) -> Result<Toaster> {
    let toaster = if sequential_ids {
        let runtime = Handle::try_current().context("Toaster requires a tokio runtime")?;
        Toaster::with_id_generator(store_config, runtime, SequentialIdGenerator::new())?
    } else {
        Toaster::new(store_config)?
    };
    Ok(toaster)
}

/// Read the script from `path`, or stdin when no path is given
pub fn read_script(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {}", path.display())),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read script from stdin")?;
            Ok(source)
        }
    }
}

/// Parse and replay the script named by `args`, printing snapshots to stdout
pub async fn run_script(args: &cli::Args, config: &config::ConfigManager) -> Result<()> {
    let source = read_script(args.script.as_deref())?;
    let commands = cli::parse_script(&source)?;
    info!("Parsed {} script commands", commands.len());

    let store_config = super::initialization::configure_store(args, config)?;
    let renderer = super::initialization::create_renderer(args, config, &store_config)?;
    let toaster = build_toaster(store_config, args.sequential_ids)?;

    let printer = Arc::new(SnapshotPrinter::new(renderer, io::stdout()));
    let observer: Arc<dyn Observer> = printer.clone();
    let subscription = toaster.subscribe_arc(observer);

    let mut session = ScriptSession::new(toaster);
    session.run(&commands, &printer).await?;

    let stats = session.toaster().stats();
    info!(
        "Script complete: {} dispatches, {} deliveries, {} evictions",
        stats.dispatches, stats.deliveries, stats.evictions
    );
    subscription.unsubscribe();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{ColourManager, OutputFormat};

    /// Writer shared between the printer and the test
    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    fn session_with_printer(
        capacity: usize,
        delay_ms: u64,
    ) -> (ScriptSession, Arc<SnapshotPrinter<SharedBuffer>>, SharedBuffer) {
        let config = StoreConfig::builder()
            .with_capacity(capacity)
            .with_remove_delay_ms(delay_ms)
            .build()
            .unwrap();
        let toaster = build_toaster(config, true).unwrap();
        let buffer = SharedBuffer::default();
        let renderer = SnapshotRenderer::new(OutputFormat::Text, ColourManager::with_colours(false), capacity);
        let printer = Arc::new(SnapshotPrinter::new(renderer, buffer.clone()));
        let observer: Arc<dyn Observer> = printer.clone();
        toaster.subscribe_arc(observer);
        (ScriptSession::new(toaster), printer, buffer)
    }

    #[tokio::test(start_paused = true)]
    async fn test_script_replay_prints_every_snapshot() {
        let (mut session, printer, buffer) = session_with_printer(5, 100);
        let commands = cli::parse_script(
            "enqueue first\nenqueue second | details\ndismiss @1\nremove-wait\nshow\n",
        )
        .unwrap();

        session.run(&commands, &printer).await.unwrap();

        // two enqueues, one dismissal, one removal, shutdown
        assert_eq!(printer.delivered(), 5);
        let output = buffer.contents();
        assert!(output.contains("snapshot 3 (2/5)\n  [open]   2  second | details\n  [closed] 1  first"));
        assert!(output.contains("snapshot 4 (1/5)\n  [open]   2  second | details\nsnapshot 4 (1/5)"));
        assert!(output.ends_with("snapshot 5 (0/5)\n  (empty)\n"));
    }

    #[tokio::test]
    async fn test_update_resolves_script_reference() {
        let (mut session, printer, _) = session_with_printer(5, 100);
        let commands = cli::parse_script("enqueue one\nenqueue two\nupdate @1 title uno\n").unwrap();
        for line in &commands {
            session.execute(line, &printer).await.unwrap();
        }

        let first = session.enqueued()[0].get().unwrap();
        assert_eq!(first.title(), Some("uno"));
        assert_eq!(session.enqueued()[1].get().unwrap().title(), Some("two"));
    }

    #[tokio::test]
    async fn test_unknown_index_is_reported() {
        let (mut session, printer, _) = session_with_printer(5, 100);
        let commands = cli::parse_script("enqueue one\ndismiss @4\n").unwrap();

        let error = session.run(&commands, &printer).await.unwrap_err();
        assert_eq!(
            error,
            ScriptError::UnknownToastRef {
                reference: "@4".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_literal_id_dismissal() {
        let (mut session, printer, _) = session_with_printer(5, 100);
        let commands = cli::parse_script("enqueue one\ndismiss 1\n").unwrap();
        for line in &commands {
            session.execute(line, &printer).await.unwrap();
        }

        assert!(!session.enqueued()[0].get().unwrap().open);
        assert!(session.toaster().is_removal_pending(&NotificationId::from("1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_shutdown_runs_once() {
        let (mut session, printer, _) = session_with_printer(5, 100);
        let commands = cli::parse_script("enqueue one\nshutdown\n").unwrap();

        session.run(&commands, &printer).await.unwrap();

        assert_eq!(printer.delivered(), 2);
        assert!(session.toaster().state().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_through_script() {
        let (mut session, printer, buffer) = session_with_printer(2, 100);
        let commands = cli::parse_script("enqueue a\nenqueue b\nenqueue c\nshow\n").unwrap();
        for line in &commands {
            session.execute(line, &printer).await.unwrap();
        }

        assert!(buffer.contents().ends_with("snapshot 3 (2/2)\n  [open]   3  c\n  [open]   2  b\n"));
        assert_eq!(session.toaster().stats().evictions, 1);
    }
}
