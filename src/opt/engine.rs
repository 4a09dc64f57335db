//! Session orchestration: owns the part and sheet inventories, drives the
//! genetic search one generation per `iterate()` call and tracks the best
//! layouts found so far.
//!
//! The inventories hold immutable templates. Every generation works on
//! fresh clones, so concurrent evaluation needs no locking beyond the
//! join barriers of the thread pool.

use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use itertools::Itertools;
use log::info;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rayon::prelude::*;

use crate::config::NestConfig;
use crate::entities::{NestItem, NestResult, Polygon};
use crate::ga::{PartInstance, Population};
use crate::opt::placement::PlacementWorker;

/// Best results kept besides the incumbent.
pub const HISTORY_LIMIT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
    Errored,
}

/// Receives user-facing failure reports. The engine reports each failure
/// exactly once, then refuses further work until `reset()`.
pub trait MessageSink: Send + Sync {
    fn message(&self, text: &str);
}

/// Default sink: forwards to the log facade.
pub struct LogSink;

impl MessageSink for LogSink {
    fn message(&self, text: &str) {
        log::error!("[NEST] {text}");
    }
}

pub struct NestEngine {
    config: NestConfig,
    parts: Vec<Polygon>,
    sheets: Vec<Polygon>,
    state: SessionState,
    stop_requested: bool,
    iterations: usize,
    current: Option<NestResult>,
    history: Vec<NestResult>,
    population: Option<Population>,
    rng: SmallRng,
    pool: Option<rayon::ThreadPool>,
    sink: Arc<dyn MessageSink>,
}

impl NestEngine {
    pub fn new(config: NestConfig) -> Self {
        Self::with_sink(config, Arc::new(LogSink))
    }

    pub fn with_sink(config: NestConfig, sink: Arc<dyn MessageSink>) -> Self {
        let rng = match config.prng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        NestEngine {
            config,
            parts: Vec::new(),
            sheets: Vec::new(),
            state: SessionState::Idle,
            stop_requested: false,
            iterations: 0,
            current: None,
            history: Vec::new(),
            population: None,
            rng,
            pool: None,
            sink,
        }
    }

    /// Adds a part template to the inventory. `source` tags shape identity;
    /// callers adding several distinct shapes should give each its own.
    pub fn add_part(&mut self, polygon: Polygon) {
        self.parts.push(polygon);
    }

    pub fn add_sheet(&mut self, mut polygon: Polygon) {
        polygon.sheet = true;
        self.sheets.push(polygon);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Best result found so far this session.
    pub fn current(&self) -> Option<&NestResult> {
        self.current.as_ref()
    }

    /// Best results in ascending fitness order, at most [`HISTORY_LIMIT`].
    pub fn history(&self) -> &[NestResult] {
        &self.history
    }

    pub fn placed_parts_count(&self) -> usize {
        self.current.as_ref().map_or(0, |r| r.placed_count())
    }

    pub fn material_utilization(&self) -> f64 {
        self.current.as_ref().map_or(0.0, |r| r.material_utilization())
    }

    /// Begins a session: clears all working state and builds the thread
    /// pool. The inventories are kept.
    pub fn start(&mut self) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.parallel_nests.max(1))
            .build()
            .context("building nesting thread pool")?;
        self.pool = Some(pool);
        self.iterations = 0;
        self.current = None;
        self.history.clear();
        self.population = None;
        self.stop_requested = false;
        self.state = SessionState::Running;
        info!(
            "[NEST] session started: {} parts, {} sheets, population {}",
            self.parts.len(),
            self.sheets.len(),
            self.config.population_size
        );
        Ok(())
    }

    /// Requests a stop; honored before the next generation starts.
    pub fn stop(&mut self) {
        self.stop_requested = true;
        if self.state == SessionState::Running {
            self.state = SessionState::Stopped;
            info!("[NEST] session stopped after {} iterations", self.iterations);
        }
    }

    /// Back to Idle. Working state is discarded, templates stay.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.stop_requested = false;
        self.iterations = 0;
        self.current = None;
        self.history.clear();
        self.population = None;
        self.pool = None;
    }

    /// Adopts a result (e.g. one from `history()`) as the current layout.
    pub fn assign_placement(&mut self, result: NestResult) {
        info!(
            "[NEST] assigned placement: {} parts on {} sheets, utilization {:.3}",
            result.placed_count(),
            result.layouts.len(),
            result.material_utilization()
        );
        self.current = Some(result);
    }

    /// Runs one generation. Failures are reported to the sink exactly once
    /// and flip the session to Errored; further calls do nothing.
    pub fn iterate(&mut self) {
        if self.state != SessionState::Running {
            return;
        }
        if self.stop_requested {
            self.state = SessionState::Stopped;
            return;
        }
        let outcome = self.run_generation();
        self.iterations += 1;
        if let Err(e) = outcome {
            self.sink.message(&format!("{e:#}"));
            self.state = SessionState::Errored;
        }
    }

    fn run_generation(&mut self) -> Result<()> {
        if self.parts.is_empty() {
            bail!("no parts in the inventory");
        }
        if self.sheets.is_empty() {
            bail!("no sheets in the inventory");
        }

        // fresh clones every generation, templates stay untouched
        let mut parts = self.parts.clone();
        let mut sheets = self.sheets.clone();
        for (i, p) in parts.iter_mut().enumerate() {
            p.id = i;
        }
        for (i, s) in sheets.iter_mut().enumerate() {
            s.id = i;
        }

        if self.config.offset_tree_phase
            && (self.config.spacing > 0.0 || self.config.sheet_spacing > 0.0)
        {
            self.offset_phase(&mut parts, &mut sheets)?;
        }

        let items = NestItem::group_by_source(&parts, false, self.config.multiplier.max(1));
        let instances = PartInstance::expand(&items, &self.config);

        let mut population = match self.population.take() {
            Some(p) if p.members[0].genes.len() == instances.len() => {
                p.next_generation(&instances, &self.config, &mut self.rng)
            }
            // first generation, or the inventory changed under us
            _ => Population::initialize(&instances, &self.config, &mut self.rng),
        };

        let worker = PlacementWorker::new(&self.config, &sheets, &instances);
        let pending = population
            .members
            .iter()
            .positions(|m| m.fitness.is_none())
            .collect_vec();

        let results: Vec<(usize, NestResult)> = if self.config.use_parallel {
            let pool = self.pool.as_ref().context("thread pool missing")?;
            pool.install(|| {
                pending
                    .par_iter()
                    .map(|&i| (i, worker.place(&population.members[i])))
                    .collect()
            })
        } else {
            pending
                .iter()
                .map(|&i| (i, worker.place(&population.members[i])))
                .collect()
        };

        let mut generation_best: Option<NestResult> = None;
        for (i, result) in results {
            population.members[i].fitness = Some(result.fitness.total);
            if generation_best
                .as_ref()
                .is_none_or(|b| result.fitness.total < b.fitness.total)
            {
                generation_best = Some(result);
            }
        }
        population.rank();
        self.population = Some(population);

        if let Some(best) = generation_best {
            let improved = self
                .current
                .as_ref()
                .is_none_or(|c| best.fitness.total < c.fitness.total);
            if improved {
                info!(
                    "[NEST] generation {}: new best fitness {:.3} ({} placed, {} unplaced, {} sheets)",
                    self.iterations,
                    best.fitness.total,
                    best.placed_count(),
                    best.unplaced.len(),
                    best.layouts.len()
                );
                self.push_history(best.clone());
                self.current = Some(best);
            }
        }
        Ok(())
    }

    /// Spacing phase: parts inflate by half the part gap, sheets move by
    /// the complement of the sheet gap. One offset per distinct source,
    /// shared by every clone of that source; sources are disjoint so the
    /// parallel arm needs no synchronization.
    fn offset_phase(&self, parts: &mut [Polygon], sheets: &mut [Polygon]) -> Result<()> {
        let inflate = self.config.spacing / 2.0;
        let sheet_delta = -(self.config.sheet_spacing - self.config.spacing / 2.0);

        if inflate > 0.0 {
            let sources = parts.iter().map(|p| p.source).unique().collect_vec();
            let offset_source = |src: &usize| -> (usize, Option<Polygon>) {
                let rep = parts
                    .iter()
                    .find(|p| p.source == *src)
                    .expect("source came from this slice");
                (*src, rep.offset_tree(inflate))
            };
            let offsets: Vec<(usize, Option<Polygon>)> =
                match (self.config.use_parallel, self.pool.as_ref()) {
                    (true, Some(pool)) => {
                        pool.install(|| sources.par_iter().map(offset_source).collect())
                    }
                    _ => sources.iter().map(offset_source).collect(),
                };
            for (src, offset) in offsets {
                let offset = offset
                    .ok_or_else(|| anyhow!("spacing offset collapsed part source {src}"))?;
                for p in parts.iter_mut().filter(|p| p.source == src) {
                    p.points = offset.points.clone();
                    p.children = offset.children.clone();
                }
            }
        }

        if sheet_delta != 0.0 {
            for sheet in sheets.iter_mut() {
                let offset = sheet
                    .offset_tree(sheet_delta)
                    .ok_or_else(|| anyhow!("sheet spacing collapsed sheet {}", sheet.id))?;
                sheet.points = offset.points;
                sheet.children = offset.children;
            }
        }
        Ok(())
    }

    fn push_history(&mut self, result: NestResult) {
        let pos = self
            .history
            .partition_point(|r| r.fitness.total <= result.fitness.total);
        self.history.insert(pos, result);
        self.history.truncate(HISTORY_LIMIT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CollectSink(Mutex<Vec<String>>);

    impl MessageSink for CollectSink {
        fn message(&self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    fn quick_config() -> NestConfig {
        NestConfig {
            rotations: 1,
            population_size: 4,
            use_parallel: false,
            offset_tree_phase: false,
            parallel_nests: 1,
            prng_seed: Some(7),
            ..NestConfig::default()
        }
    }

    fn small_engine() -> NestEngine {
        let mut engine = NestEngine::new(quick_config());
        for i in 0..4 {
            let mut p = Polygon::rectangle(2.0, 2.0);
            p.source = i;
            engine.add_part(p);
        }
        engine.add_sheet(Polygon::rectangle(10.0, 10.0));
        engine
    }

    #[test]
    fn state_machine_transitions() {
        let mut engine = small_engine();
        assert_eq!(engine.state(), SessionState::Idle);
        engine.start().unwrap();
        assert_eq!(engine.state(), SessionState::Running);
        engine.iterate();
        assert_eq!(engine.iterations(), 1);
        engine.stop();
        assert_eq!(engine.state(), SessionState::Stopped);
        engine.iterate(); // no-op when stopped
        assert_eq!(engine.iterations(), 1);
        engine.reset();
        assert_eq!(engine.state(), SessionState::Idle);
        assert_eq!(engine.iterations(), 0);
        assert!(engine.current().is_none());
    }

    #[test]
    fn small_nest_places_everything() {
        let mut engine = small_engine();
        engine.start().unwrap();
        for _ in 0..3 {
            engine.iterate();
        }
        assert_eq!(engine.state(), SessionState::Running);
        let best = engine.current().expect("a result after iterating");
        assert_eq!(best.unplaced.len(), 0);
        assert_eq!(best.placed_count(), 4);
        assert_eq!(best.layouts.len(), 1);
        assert_eq!(engine.placed_parts_count(), 4);
        assert!(engine.material_utilization() > 0.0);
        assert!(!engine.history().is_empty());
        assert!(
            engine
                .history()
                .windows(2)
                .all(|w| w[0].fitness.total <= w[1].fitness.total)
        );
    }

    #[test]
    fn empty_inventory_errors_once() {
        let sink = Arc::new(CollectSink(Mutex::new(Vec::new())));
        let mut engine = NestEngine::with_sink(quick_config(), sink.clone());
        engine.start().unwrap();
        engine.iterate();
        assert_eq!(engine.state(), SessionState::Errored);
        assert_eq!(engine.iterations(), 1);
        engine.iterate(); // errored sessions refuse further work
        assert_eq!(engine.iterations(), 1);
        assert_eq!(sink.0.lock().unwrap().len(), 1);
    }

    #[test]
    fn assign_placement_is_idempotent() {
        let mut engine = small_engine();
        engine.start().unwrap();
        engine.iterate();
        let best = engine.current().unwrap().clone();
        engine.assign_placement(best.clone());
        engine.assign_placement(best.clone());
        assert_eq!(engine.current(), Some(&best));
        assert_eq!(engine.placed_parts_count(), best.placed_count());
    }

    #[test]
    fn spacing_phase_separates_parts() {
        let mut config = quick_config();
        config.offset_tree_phase = true;
        config.spacing = 2.0;
        config.sheet_spacing = 1.0;
        let spacing = config.spacing;
        let mut engine = NestEngine::new(config);
        for i in 0..2 {
            let mut p = Polygon::rectangle(3.0, 3.0);
            p.source = i;
            engine.add_part(p);
        }
        engine.add_sheet(Polygon::rectangle(20.0, 20.0));
        engine.start().unwrap();
        engine.iterate();
        assert_eq!(engine.state(), SessionState::Running);
        let best = engine.current().unwrap();
        assert_eq!(best.placed_count(), 2);
        let l = &best.layouts[0];
        // inflated outlines touch, so the true 3x3 parts sit >= spacing apart
        let a = &l.placements[0];
        let b = &l.placements[1];
        let gap = (a.x - b.x).abs().max((a.y - b.y).abs());
        assert!(gap >= 3.0 + spacing - 1e-6, "gap {gap}");
    }
}
