//! PRISM Viewer - the single-threaded view event loop

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use prism_core::{CreateFormula, PrismResult, Update};
use prism_visual::{EntityResolver, RenderSurface};

use crate::{
    update_channels, ClickTarget, CommandDispatch, CommandSink, UpdateRouter, UpdateSenders,
    UpdateStreams, ViewContext, ViewerConfig,
};

/// Viewer counters
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewerStats {
    pub updates: u64,
    pub positions: u64,
    pub formulas: u64,
    pub entities: u64,
    pub turns: u64,
    pub style_writes: u64,
    pub clicks: u64,
    pub commands: u64,
    /// Clicks whose command the sink refused
    pub rejected: u64,
}

/// Input delivered to the event loop
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerEvent {
    Update(Update),
    Click(ClickTarget),
}

/// Producer handles for the synchronization layer and the host
#[derive(Clone, Debug)]
pub struct ViewerHandles {
    pub updates: UpdateSenders,
    pub clicks: mpsc::Sender<ClickTarget>,
}

/// Consumer side of everything the event loop listens to
#[derive(Debug)]
pub struct ViewerInputs {
    updates: UpdateStreams,
    clicks: mpsc::Receiver<ClickTarget>,
    clicks_open: bool,
}

impl ViewerInputs {
    /// Next event. Once both update streams have closed, clicks already
    /// queued are still delivered, then `None`; clicks alone do not keep
    /// the loop alive.
    pub async fn next(&mut self) -> Option<ViewerEvent> {
        while self.updates.is_open() {
            tokio::select! {
                update = self.updates.next() => match update {
                    Some(update) => return Some(ViewerEvent::Update(update)),
                    None => break,
                },
                click = self.clicks.recv(), if self.clicks_open => match click {
                    Some(target) => return Some(ViewerEvent::Click(target)),
                    None => self.clicks_open = false,
                },
            }
        }

        if self.clicks_open {
            match self.clicks.try_recv() {
                Ok(target) => return Some(ViewerEvent::Click(target)),
                Err(_) => self.clicks_open = false,
            }
        }
        None
    }
}

/// Create the viewer's input channels
pub fn viewer_channels(config: &ViewerConfig) -> (ViewerHandles, ViewerInputs) {
    let (updates, streams) = update_channels(config.stream_buffer);
    let (click_tx, click_rx) = mpsc::channel(config.stream_buffer);

    (
        ViewerHandles {
            updates,
            clicks: click_tx,
        },
        ViewerInputs {
            updates: streams,
            clicks: click_rx,
            clicks_open: true,
        },
    )
}

/// PRISM Viewer - routes remote state onto a render surface and turns
/// empty-canvas clicks into commands
pub struct Viewer<S, R> {
    context: ViewContext<S, R>,
    router: UpdateRouter,
    dispatch: CommandDispatch,
    sink: Box<dyn CommandSink>,
    config: ViewerConfig,
    stats: ViewerStats,
}

impl<S: RenderSurface, R: EntityResolver> Viewer<S, R> {
    pub fn new(
        surface: S,
        resolver: R,
        sink: impl CommandSink + 'static,
        config: ViewerConfig,
    ) -> PrismResult<Self> {
        config.validate()?;

        let dispatch = match config.command_seed {
            Some(seed) => CommandDispatch::seeded(seed),
            None => CommandDispatch::from_entropy(),
        };

        Ok(Viewer {
            context: ViewContext::with_config(surface, resolver, &config),
            router: UpdateRouter::new(),
            dispatch,
            sink: Box::new(sink),
            config,
            stats: ViewerStats::default(),
        })
    }

    pub fn context(&self) -> &ViewContext<S, R> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ViewContext<S, R> {
        &mut self.context
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Synchronization has started: clicks may now submit commands
    pub fn start_sync(&mut self) {
        self.dispatch.arm();
    }

    pub fn is_syncing(&self) -> bool {
        self.dispatch.is_armed()
    }

    pub fn stats(&self) -> ViewerStats {
        let router = self.router.stats();
        ViewerStats {
            updates: router.total(),
            positions: router.positions,
            formulas: router.formulas,
            entities: self.context.registry().len() as u64,
            commands: self.dispatch.submitted(),
            ..self.stats.clone()
        }
    }

    /// One turn with a single update: route it, then run the deferred
    /// style writes
    pub fn process(&mut self, update: Update) -> PrismResult<()> {
        self.router.route(&mut self.context, update)?;
        self.end_turn()
    }

    /// One turn with several updates. Deferred writes for the same property
    /// collapse to the last one scheduled.
    pub fn process_batch(&mut self, updates: impl IntoIterator<Item = Update>) -> PrismResult<()> {
        for update in updates {
            self.router.route(&mut self.context, update)?;
        }
        self.end_turn()
    }

    fn end_turn(&mut self) -> PrismResult<()> {
        let applied = self.context.flush()?;
        self.stats.turns += 1;
        self.stats.style_writes += applied as u64;
        Ok(())
    }

    pub fn handle_click(&mut self, target: ClickTarget) -> PrismResult<Option<CreateFormula>> {
        self.stats.clicks += 1;
        self.dispatch.on_click(target, self.sink.as_mut())
    }

    /// Drive the loop until both update streams close. A routing failure is
    /// a broken collaborator contract and ends the loop with the error. A
    /// refused command is logged and counted; rendering carries on.
    pub async fn run(&mut self, inputs: &mut ViewerInputs) -> PrismResult<ViewerStats> {
        info!(
            entity_class = %self.config.entity_class,
            defer_styles = self.config.defer_styles,
            "viewer started"
        );

        while let Some(event) = inputs.next().await {
            match event {
                ViewerEvent::Update(update) => {
                    if let Err(e) = self.process(update) {
                        error!(error = %e, "viewer stopped on fatal error");
                        return Err(e);
                    }
                }
                ViewerEvent::Click(target) => {
                    if let Err(e) = self.handle_click(target) {
                        warn!(error = %e, ?target, "command not submitted");
                        self.stats.rejected += 1;
                    }
                }
            }
        }

        let stats = self.stats();
        info!(
            updates = stats.updates,
            entities = stats.entities,
            commands = stats.commands,
            "viewer stopped"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_core::{AttributeUpdate, EntityId, EntityIndex, Formula, Magnitude, Position, PrismError};
    use prism_visual::{MemorySurface, StyleProperty};

    use crate::ChannelCommandSink;

    fn ids() -> Vec<EntityId> {
        vec![
            EntityId::from_hex("0x0000ff01").unwrap(),
            EntityId::from_hex("0x80808002").unwrap(),
        ]
    }

    fn viewer() -> Viewer<MemorySurface, Vec<EntityId>> {
        let config = ViewerConfig {
            command_seed: Some(5),
            ..ViewerConfig::default()
        };
        Viewer::new(MemorySurface::default(), ids(), Vec::<CreateFormula>::new(), config).unwrap()
    }

    #[test]
    fn test_process_flushes_each_turn() {
        let mut viewer = viewer();
        viewer
            .process(AttributeUpdate::set(EntityIndex(0), Position::new(3.0, 4.0)).into())
            .unwrap();

        let surface = viewer.context().surface();
        let node = viewer.context().registry().get(EntityIndex(0)).unwrap().node();
        assert_eq!(surface.style(node, StyleProperty::Left), Some("3px"));
        assert_eq!(surface.style(node, StyleProperty::BackgroundColor), Some("rgb(0, 0, 255)"));
        assert!(viewer.context().scheduler().is_empty());
    }

    #[test]
    fn test_batch_last_write_wins() {
        let mut viewer = viewer();
        viewer
            .process_batch([
                AttributeUpdate::set(EntityIndex(1), Position::new(1.0, 1.0)).into(),
                AttributeUpdate::set(EntityIndex(1), Position::new(9.0, 8.0)).into(),
            ])
            .unwrap();

        let node = viewer.context().registry().get(EntityIndex(1)).unwrap().node();
        assert_eq!(viewer.context().surface().style(node, StyleProperty::Left), Some("9px"));
        assert_eq!(viewer.stats().turns, 1);
    }

    #[test]
    fn test_clicks_need_sync() {
        let mut viewer = viewer();
        assert_eq!(viewer.handle_click(ClickTarget::Root).unwrap(), None);

        viewer.start_sync();
        assert!(viewer.is_syncing());
        assert!(viewer.handle_click(ClickTarget::Background).unwrap().is_some());

        let stats = viewer.stats();
        assert_eq!(stats.clicks, 2);
        assert_eq!(stats.commands, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ViewerConfig {
            stream_buffer: 0,
            ..ViewerConfig::default()
        };
        assert!(Viewer::new(MemorySurface::default(), ids(), Vec::<CreateFormula>::new(), config).is_err());
    }

    #[tokio::test]
    async fn test_run_until_streams_close() {
        let mut viewer = viewer();
        let (handles, mut inputs) = viewer_channels(viewer.config());
        viewer.start_sync();

        let formula = Formula::new(Magnitude::from_u64(0x0105), Magnitude::from_u64(2));
        handles
            .updates
            .send(AttributeUpdate::set(EntityIndex(0), formula).into())
            .await
            .unwrap();
        handles
            .updates
            .send(AttributeUpdate::set(EntityIndex(1), Position::new(10.0, 20.0)).into())
            .await
            .unwrap();
        handles.clicks.send(ClickTarget::Root).await.unwrap();
        drop(handles);

        let stats = viewer.run(&mut inputs).await.unwrap();
        assert_eq!(stats.updates, 2);
        assert_eq!(stats.entities, 2);
        assert_eq!(stats.clicks, 1);
        assert_eq!(stats.commands, 1);

        let node = viewer.context().registry().get(EntityIndex(0)).unwrap().node();
        assert_eq!(viewer.context().surface().title(node), Some("1x + 5 = 2"));
    }

    #[tokio::test]
    async fn test_queued_clicks_delivered_after_updates_close() {
        let (handles, mut inputs) = viewer_channels(&ViewerConfig::default());
        handles.clicks.send(ClickTarget::Background).await.unwrap();
        handles.clicks.send(ClickTarget::Root).await.unwrap();
        drop(handles.updates);

        assert_eq!(inputs.next().await, Some(ViewerEvent::Click(ClickTarget::Background)));
        assert_eq!(inputs.next().await, Some(ViewerEvent::Click(ClickTarget::Root)));
        assert_eq!(inputs.next().await, None);
        assert_eq!(inputs.next().await, None);
    }

    #[tokio::test]
    async fn test_full_command_channel_keeps_rendering() {
        let config = ViewerConfig {
            command_seed: Some(5),
            ..ViewerConfig::default()
        };
        let (sink, _commands) = ChannelCommandSink::channel(1);
        let mut viewer = Viewer::new(MemorySurface::default(), ids(), sink, config).unwrap();
        let (handles, mut inputs) = viewer_channels(viewer.config());
        viewer.start_sync();

        handles.clicks.send(ClickTarget::Root).await.unwrap();
        handles.clicks.send(ClickTarget::Root).await.unwrap();
        handles
            .updates
            .send(AttributeUpdate::set(EntityIndex(1), Position::new(6.0, 7.0)).into())
            .await
            .unwrap();
        drop(handles);

        let stats = viewer.run(&mut inputs).await.unwrap();
        assert_eq!(stats.clicks, 2);
        assert_eq!(stats.commands, 1);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.entities, 1);

        let node = viewer.context().registry().get(EntityIndex(1)).unwrap().node();
        assert_eq!(viewer.context().surface().style(node, StyleProperty::Left), Some("6px"));
    }

    #[tokio::test]
    async fn test_run_stops_on_unresolved_entity() {
        let mut viewer = viewer();
        let (handles, mut inputs) = viewer_channels(viewer.config());

        handles
            .updates
            .send(AttributeUpdate::<Position>::clear(EntityIndex(7)).into())
            .await
            .unwrap();

        let err = viewer.run(&mut inputs).await.unwrap_err();
        assert_eq!(err, PrismError::UnresolvedEntity(EntityIndex(7)));
    }
}
