//! End-to-end scenario harness
//!
//! Drives a [`Viewer`] over a [`MemorySurface`] from a seeded
//! [`SimulatedLedger`], then checks the rendered tree against the ledger:
//! - one entity node per visual object
//! - colors match the identity decoded from the identifier
//! - labels match the formatted formula, or are empty once cleared
//! - `left`/`top` match the last position, or are unset once cleared

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use prism_core::{EntityIndex, PrismError, PrismResult};
use prism_runtime::{viewer_channels, ClickTarget, Viewer, ViewerConfig, ViewerStats};
use prism_visual::{formula_label, px, MemorySurface, StyleProperty, VisualIdentity, VisualObject};

use crate::{LedgerHandle, SimulatedLedger};

/// Scenario parameters
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    /// Entities registered before the first update
    pub entity_count: usize,
    /// Ledger updates to generate
    pub update_count: usize,
    /// Probability that an update clears its attribute
    pub clear_prob: f64,
    /// Probability of a user click before each update
    pub click_prob: f64,
    /// Updates delivered per viewer turn
    pub batch_size: usize,
    pub seed: u64,
    pub defer_styles: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl ScenarioConfig {
    pub fn light() -> Self {
        Self {
            entity_count: 8,
            update_count: 200,
            clear_prob: 0.1,
            click_prob: 0.02,
            batch_size: 1,
            seed: 42,
            defer_styles: true,
        }
    }

    pub fn standard() -> Self {
        Self {
            entity_count: 32,
            update_count: 2_000,
            clear_prob: 0.1,
            click_prob: 0.01,
            batch_size: 4,
            seed: 42,
            defer_styles: true,
        }
    }

    pub fn heavy() -> Self {
        Self {
            entity_count: 256,
            update_count: 20_000,
            clear_prob: 0.2,
            click_prob: 0.01,
            batch_size: 16,
            seed: 42,
            defer_styles: true,
        }
    }

    pub fn validate(&self) -> PrismResult<()> {
        if !(0.0..=1.0).contains(&self.clear_prob) {
            return Err(PrismError::InvalidConfig("clear_prob outside [0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.click_prob) {
            return Err(PrismError::InvalidConfig("click_prob outside [0, 1]".into()));
        }
        if self.batch_size == 0 {
            return Err(PrismError::InvalidConfig("batch_size must be positive".into()));
        }
        Ok(())
    }
}

/// Scenario outcome
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    pub stats: ViewerStats,
    pub commands_applied: u64,
    pub violations: Vec<String>,
}

impl ScenarioResult {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Viewer wired to a simulated ledger
pub struct Scenario {
    config: ScenarioConfig,
    ledger: LedgerHandle,
    viewer: Viewer<MemorySurface, LedgerHandle>,
    rng: StdRng,
}

impl Scenario {
    pub fn new(config: ScenarioConfig) -> PrismResult<Self> {
        config.validate()?;

        let mut ledger = SimulatedLedger::new(config.seed);
        for _ in 0..config.entity_count {
            ledger.spawn()?;
        }
        let ledger = LedgerHandle::new(ledger);

        let viewer_config = ViewerConfig {
            defer_styles: config.defer_styles,
            command_seed: Some(config.seed.wrapping_add(1)),
            ..ViewerConfig::default()
        };
        let surface = MemorySurface::new(&viewer_config.root_class);
        let mut viewer = Viewer::new(surface, ledger.clone(), ledger.clone(), viewer_config)?;
        viewer.start_sync();

        Ok(Scenario {
            rng: StdRng::seed_from_u64(config.seed.wrapping_add(2)),
            config,
            ledger,
            viewer,
        })
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn ledger(&self) -> &LedgerHandle {
        &self.ledger
    }

    pub fn viewer(&self) -> &Viewer<MemorySurface, LedgerHandle> {
        &self.viewer
    }

    /// Any node may be clicked, the root and the page background included
    fn random_click(&mut self) -> ClickTarget {
        let nodes = self.viewer.context().surface().entity_nodes();
        match self.rng.gen_range(0..3) {
            0 => ClickTarget::Background,
            1 if !nodes.is_empty() => {
                ClickTarget::Entity(nodes[self.rng.gen_range(0..nodes.len())])
            }
            _ => ClickTarget::Root,
        }
    }

    /// Deliver everything the ledger has emitted as one viewer turn
    fn deliver(&mut self) -> PrismResult<()> {
        let batch = self.ledger.borrow_mut().drain();
        if batch.is_empty() {
            return Ok(());
        }
        self.viewer.process_batch(batch)
    }

    /// Run synchronously, one `process_batch` per `batch_size` updates
    pub fn run(&mut self) -> PrismResult<ScenarioResult> {
        info!(
            entities = self.config.entity_count,
            updates = self.config.update_count,
            seed = self.config.seed,
            "scenario started"
        );

        for step in 0..self.config.update_count {
            if self.rng.gen_bool(self.config.click_prob) {
                let target = self.random_click();
                self.viewer.handle_click(target)?;
            }

            self.ledger.borrow_mut().random_update(self.config.clear_prob)?;

            if (step + 1) % self.config.batch_size == 0 {
                self.deliver()?;
            }
        }
        self.deliver()?;

        Ok(self.finish())
    }

    /// Run through the viewer's channels and event loop: updates and clicks
    /// are produced concurrently with the loop on the current task
    pub async fn run_streamed(&mut self) -> PrismResult<ScenarioResult> {
        let (handles, mut inputs) = viewer_channels(self.viewer.config());

        let ledger = self.ledger.clone();
        let config = self.config.clone();
        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(3));

        let producer = async move {
            for _ in 0..config.update_count {
                if rng.gen_bool(config.click_prob) {
                    let target = if rng.gen_bool(0.5) {
                        ClickTarget::Root
                    } else {
                        ClickTarget::Background
                    };
                    handles
                        .clicks
                        .send(target)
                        .await
                        .map_err(|e| PrismError::CommandRejected(e.to_string()))?;
                }

                ledger.borrow_mut().random_update(config.clear_prob)?;
                let batch = ledger.borrow_mut().drain();
                for update in batch {
                    handles.updates.send(update).await?;
                }
            }
            Ok::<_, PrismError>(())
        };

        let (produced, consumed) = tokio::join!(producer, self.viewer.run(&mut inputs));
        produced?;
        consumed?;

        // Commands from the last clicks land after the streams closed
        self.deliver()?;
        Ok(self.finish())
    }

    fn finish(&self) -> ScenarioResult {
        let violations = self.check_invariants();
        let result = ScenarioResult {
            stats: self.viewer.stats(),
            commands_applied: self.ledger.borrow().commands_applied(),
            violations,
        };

        if result.passed() {
            info!(
                updates = result.stats.updates,
                entities = result.stats.entities,
                commands = result.commands_applied,
                "scenario passed"
            );
        } else {
            warn!(violations = result.violations.len(), "scenario failed");
        }
        result
    }

    /// Compare the rendered tree with the ledger's latest values
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let context = self.viewer.context();
        let surface = context.surface();
        let registry = context.registry();

        if registry.len() != surface.entity_nodes().len() {
            violations.push(format!(
                "registry holds {} objects but the root has {} entity nodes",
                registry.len(),
                surface.entity_nodes().len()
            ));
        }
        if !context.scheduler().is_empty() {
            violations.push(format!(
                "{} style writes still pending after the last turn",
                context.scheduler().len()
            ));
        }

        for (index, object) in registry.iter() {
            self.check_object(*index, object, surface, &mut violations);
        }
        violations
    }

    fn check_object(
        &self,
        index: EntityIndex,
        object: &VisualObject,
        surface: &MemorySurface,
        violations: &mut Vec<String>,
    ) {
        let ledger = self.ledger.borrow();
        let node = object.node();

        match ledger.identifier(index) {
            Some(id) if id == object.id() => {}
            _ => violations.push(format!("{}: identifier does not match the ledger", index)),
        }

        let identity = VisualIdentity::decode(object.id());
        let color = surface.style(node, StyleProperty::BackgroundColor);
        if color != Some(identity.css_color().as_str()) {
            violations.push(format!("{}: background-color {:?}", index, color));
        }

        let expected_title = ledger.formula(index).map(formula_label).unwrap_or_default();
        let title = surface.title(node).unwrap_or_default();
        if title != expected_title {
            violations.push(format!(
                "{}: title {:?}, expected {:?}",
                index, title, expected_title
            ));
        }

        let expected = ledger.position(index);
        let left = surface.style(node, StyleProperty::Left).map(str::to_string);
        let top = surface.style(node, StyleProperty::Top).map(str::to_string);
        if left != expected.map(|p| px(p.x)) || top != expected.map(|p| px(p.y)) {
            violations.push(format!(
                "{}: left/top {:?}/{:?}, expected {:?}",
                index, left, top, expected
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_scenario_passes() {
        let mut scenario = Scenario::new(ScenarioConfig::light()).unwrap();
        let result = scenario.run().unwrap();

        assert!(result.passed(), "violations: {:?}", result.violations);
        assert_eq!(result.stats.updates, 200 + 2 * result.commands_applied);
        assert!(result.stats.entities > 0);
    }

    #[test]
    fn test_standard_scenario_passes() {
        let mut scenario = Scenario::new(ScenarioConfig::standard()).unwrap();
        let result = scenario.run().unwrap();
        assert!(result.passed(), "violations: {:?}", result.violations);
    }

    #[test]
    fn test_immediate_styles_pass() {
        let config = ScenarioConfig {
            defer_styles: false,
            seed: 7,
            ..ScenarioConfig::light()
        };
        let result = Scenario::new(config).unwrap().run().unwrap();
        assert!(result.passed(), "violations: {:?}", result.violations);
    }

    #[test]
    fn test_clicks_spawn_entities() {
        let config = ScenarioConfig {
            click_prob: 1.0,
            update_count: 20,
            ..ScenarioConfig::light()
        };
        let mut scenario = Scenario::new(config).unwrap();
        let result = scenario.run().unwrap();

        assert!(result.passed(), "violations: {:?}", result.violations);
        assert_eq!(result.stats.clicks, 20);
        assert!(result.commands_applied > 0);
        assert_eq!(result.stats.commands, result.commands_applied);
        assert_eq!(
            scenario.ledger().borrow().len(),
            8 + result.commands_applied as usize
        );
    }

    #[test]
    fn test_same_seed_same_html() {
        let run = |seed| {
            let config = ScenarioConfig {
                seed,
                ..ScenarioConfig::light()
            };
            let mut scenario = Scenario::new(config).unwrap();
            scenario.run().unwrap();
            scenario.viewer().context().surface().to_html()
        };
        assert_eq!(run(11), run(11));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ScenarioConfig {
            clear_prob: 1.5,
            ..ScenarioConfig::light()
        };
        assert!(Scenario::new(config).is_err());

        let config = ScenarioConfig {
            batch_size: 0,
            ..ScenarioConfig::light()
        };
        assert!(Scenario::new(config).is_err());
    }

    #[tokio::test]
    async fn test_streamed_scenario_passes() {
        let config = ScenarioConfig {
            click_prob: 0.1,
            ..ScenarioConfig::light()
        };
        let mut scenario = Scenario::new(config).unwrap();
        let result = scenario.run_streamed().await.unwrap();

        assert!(result.passed(), "violations: {:?}", result.violations);
        assert!(result.stats.updates >= 200);
    }
}
