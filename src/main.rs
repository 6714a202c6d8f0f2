//! Lockpicker headless demo
//!
//! Plays through the London catalog with an autopilot driving every lock
//! through pointer input, the way a player's taps would. Between jobs it
//! banks rewards, runs side quests and shops for tools.
//!
//! Usage: `lockpicker [seed] [settings.json]`

use lockpicker::feedback::{Recorder, SoundCue};
use lockpicker::heist::HeistPhase;
use lockpicker::mission::{Mission, MissionCatalog};
use lockpicker::progress::PlayerProgress;
use lockpicker::tables::{DifficultyTable, ToolKind};
use lockpicker::{HeistEvent, HeistRun, HeistSettings, PuzzleEvent};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

mod autopilot {
    use lockpicker::layout::KeypadKey;
    use lockpicker::puzzle::cracker::{CrackerPhase, CrackerPuzzle};
    use lockpicker::puzzle::memory::{MemoryPhase, MemoryPuzzle};
    use lockpicker::puzzle::pattern::{PatternPhase, PatternPuzzle};
    use lockpicker::puzzle::{RotationPuzzle, SliderPuzzle, score_guess};
    use lockpicker::{PointerEvent, PuzzleInstance};

    /// Seconds between deliberate moves
    const REACTION_TIME: f32 = 0.15;

    /// Plays whichever lock is live. Reads only what a player could see.
    #[derive(Debug, Default)]
    pub struct Autopilot {
        cooldown: f32,
        /// Longest pattern prefix seen while it was lit
        memorized: Vec<usize>,
    }

    impl Autopilot {
        /// Forget everything about the previous lock
        pub fn reset(&mut self) {
            self.cooldown = 0.0;
            self.memorized.clear();
        }

        /// Pointer events to send this frame
        pub fn plan(&mut self, puzzle: &PuzzleInstance, dt: f32) -> Vec<PointerEvent> {
            if let PuzzleInstance::Pattern(p) = puzzle {
                self.watch_pattern(p);
            }
            // Timing taps can't wait for a reaction delay
            if let PuzzleInstance::Slider(p) = puzzle {
                return plan_slider(p);
            }

            self.cooldown -= dt;
            if self.cooldown > 0.0 {
                return Vec::new();
            }
            let moves = match puzzle {
                PuzzleInstance::Slider(_) => Vec::new(),
                PuzzleInstance::Rotation(p) => plan_rotation(p),
                PuzzleInstance::Memory(p) => plan_memory(p),
                PuzzleInstance::Pattern(p) => self.plan_pattern(p),
                PuzzleInstance::Cracker(p) => plan_cracker(p),
            };
            if !moves.is_empty() {
                self.cooldown = REACTION_TIME;
            }
            moves
        }

        fn watch_pattern(&mut self, p: &PatternPuzzle) {
            let visible = p.visible_path();
            if visible.len() > self.memorized.len() {
                self.memorized = visible.to_vec();
            }
        }

        fn plan_pattern(&self, p: &PatternPuzzle) -> Vec<PointerEvent> {
            if p.phase() != PatternPhase::Input {
                return Vec::new();
            }
            match self.memorized.get(p.traced().len()) {
                Some(&node) => {
                    let at = p.layout().nodes[node];
                    vec![PointerEvent::down(at.x, at.y)]
                }
                None => Vec::new(),
            }
        }
    }

    fn plan_slider(p: &SliderPuzzle) -> Vec<PointerEvent> {
        match p.current_zone() {
            // Wait for the indicator to be well inside the sweet spot
            Some(zone) if (p.position() - zone.center).abs() < zone.tolerance * 0.5 => {
                let at = p.layout().point_at(p.position());
                vec![PointerEvent::down(at.x, at.y)]
            }
            _ => Vec::new(),
        }
    }

    /// Grab the rim, turn the dial onto the target in two strokes, let go
    fn plan_rotation(p: &RotationPuzzle) -> Vec<PointerEvent> {
        let Some(target) = p.current_target() else {
            return Vec::new();
        };
        let layout = p.layout();
        let delta = lockpicker::wrap_delta_degrees(target - p.angle());
        let start = layout.rim_point(0.0);
        let mid = layout.rim_point(delta / 2.0);
        let end = layout.rim_point(delta);
        vec![
            PointerEvent::down(start.x, start.y),
            PointerEvent::moved(mid.x, mid.y),
            PointerEvent::moved(end.x, end.y),
            PointerEvent::up(end.x, end.y),
        ]
    }

    /// Perfect recall of the opening reveal
    fn plan_memory(p: &MemoryPuzzle) -> Vec<PointerEvent> {
        let tiles = p.tiles();
        let pick = match p.phase() {
            MemoryPhase::AwaitingFirstPick => tiles.iter().position(|t| !t.matched),
            MemoryPhase::AwaitingSecondPick { first } => tiles
                .iter()
                .enumerate()
                .position(|(i, t)| i != first && !t.matched && t.pair == tiles[first].pair),
            _ => None,
        };
        match pick {
            Some(index) => {
                let at = p.layout().tiles[index].center();
                vec![PointerEvent::down(at.x, at.y)]
            }
            None => Vec::new(),
        }
    }

    /// Type the first code consistent with the hints and every score so far
    fn plan_cracker(p: &CrackerPuzzle) -> Vec<PointerEvent> {
        if p.phase() != CrackerPhase::Guessing || !p.input().is_empty() {
            return Vec::new();
        }
        let guess = next_guess(p);
        let layout = p.layout();
        guess
            .into_iter()
            .map(KeypadKey::Digit)
            .chain(std::iter::once(KeypadKey::Submit))
            .map(|key| {
                let rect = match key {
                    KeypadKey::Digit(d) => layout.digits[usize::from(d)],
                    KeypadKey::Submit => layout.submit,
                    KeypadKey::Delete => layout.delete,
                };
                let at = rect.center();
                PointerEvent::down(at.x, at.y)
            })
            .collect()
    }

    fn next_guess(p: &CrackerPuzzle) -> Vec<u8> {
        let n = p.digit_count();
        let space = 10u64.pow(n as u32);
        (0..space)
            .map(|value| {
                let mut code = vec![0u8; n];
                let mut rest = value;
                for slot in code.iter_mut().rev() {
                    *slot = (rest % 10) as u8;
                    rest /= 10;
                }
                code
            })
            .find(|code| {
                p.hints().iter().zip(code).all(|(hint, d)| hint.is_none_or(|h| h == *d))
                    && p.guesses().iter().all(|g| score_guess(code, &g.digits) == g.score)
            })
            .unwrap_or_else(|| vec![0; n])
    }
}

use autopilot::Autopilot;

/// Simulation step for the demo (60 Hz)
const FRAME_DT: f32 = 1.0 / 60.0;

/// Blow the door when the clock gets this low
const DYNAMITE_THRESHOLD_SECONDS: u32 = 6;

/// Attempts per mission before the demo gives up
const MAX_ATTEMPTS: u32 = 3;

struct Outcome {
    success: bool,
    layers_cleared: u32,
}

/// Drive one heist to its end with the autopilot
fn play(run: &mut HeistRun, progress: &mut PlayerProgress) -> Outcome {
    let mut pilot = Autopilot::default();
    let mut layers_cleared = 0;
    let mut events = run.begin().unwrap_or_default();

    loop {
        for event in events.drain(..) {
            match &event {
                HeistEvent::LayerStarted { index, kind } => {
                    pilot.reset();
                    log::info!("  layer {}: {}", index + 1, kind.display_name());
                }
                HeistEvent::LayerSolved { skipped, .. } => {
                    if !skipped {
                        layers_cleared += 1;
                    }
                }
                HeistEvent::Puzzle { event: PuzzleEvent::AttemptsExhausted { secret }, .. } => {
                    log::debug!("  code was {:?}", secret);
                }
                HeistEvent::Puzzle { event: PuzzleEvent::ZoneMissed { .. }, .. }
                | HeistEvent::Puzzle { event: PuzzleEvent::PatternReset, .. } => {
                    log::debug!("  slip: {:?}", event);
                }
                HeistEvent::MissionComplete { .. } => {
                    return Outcome { success: true, layers_cleared };
                }
                HeistEvent::MissionFailed { layers_completed, total_layers, .. } => {
                    log::warn!("  busted after {}/{} layers", layers_completed, total_layers);
                    return Outcome { success: false, layers_cleared };
                }
                _ => {}
            }
        }
        if run.phase() != HeistPhase::LayerRunning {
            return Outcome { success: run.phase() == HeistPhase::Success, layers_cleared };
        }

        // Low on time: spend a charge if we have one
        if run.remaining_seconds() <= DYNAMITE_THRESHOLD_SECONDS && progress.use_skip_charge().is_ok() {
            log::info!("  dynamite!");
            match run.skip_layer() {
                Ok(skip_events) => events.extend(skip_events),
                Err(e) => log::warn!("  skip failed: {}", e),
            }
            continue;
        }

        if let Some(puzzle) = run.active_puzzle() {
            for pointer in pilot.plan(puzzle, FRAME_DT) {
                events.extend(run.pointer(pointer));
            }
        }
        events.extend(run.tick(FRAME_DT));
    }
}

/// Spend spare money on the cheapest upgrade or tool
fn go_shopping(progress: &mut PlayerProgress) {
    loop {
        let purchase = ToolKind::ALL
            .into_iter()
            .filter(|tool| *tool != ToolKind::Dynamite)
            .filter_map(|tool| {
                let state = progress.tools.get(tool);
                let spec = tool.spec();
                let cost = if !state.owned {
                    progress.price_of(spec.price)
                } else {
                    *spec.upgrade_costs.get(usize::from(state.level.max(1) - 1))?
                };
                Some((cost, tool, state.owned))
            })
            .filter(|(cost, _, _)| *cost <= progress.money)
            .min_by_key(|(cost, _, _)| *cost);

        let Some((_, tool, owned)) = purchase else {
            break;
        };
        let result = if owned { progress.upgrade_tool(tool) } else { progress.buy_tool(tool) };
        if let Err(e) = result {
            log::warn!("Shop: {}", e);
            break;
        }
    }
}

fn run_mission(
    mission: &Mission,
    progress: &mut PlayerProgress,
    table: &DifficultyTable,
    settings: &HeistSettings,
    rng: &mut Pcg32,
) -> Result<bool, lockpicker::ConfigError> {
    for attempt in 1..=MAX_ATTEMPTS {
        log::info!("{} (attempt {})", mission.name, attempt);
        let seed = rng.random();
        let (recorder, feedback) = Recorder::feedback();
        let mut run =
            HeistRun::new(mission.clone(), &progress.tools, table, settings, seed)?.with_feedback(feedback);
        let outcome = play(&mut run, progress);
        log::debug!(
            "  {} cues, {} fails",
            recorder.sounds().len(),
            recorder.count_sound(SoundCue::LockFail)
        );
        progress.record_puzzles_solved(outcome.layers_cleared);
        if outcome.success {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Lockpicker (headless) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x10c6_71c6u64);
    let settings = match args.next() {
        Some(path) => match HeistSettings::load_from_path(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => HeistSettings::default(),
    };

    if let Err(e) = run_campaign(seed, &settings) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run_campaign(seed: u64, settings: &HeistSettings) -> Result<(), lockpicker::ConfigError> {
    let catalog = MissionCatalog::london()?;
    let table = DifficultyTable::standard();
    let mut progress = PlayerProgress::new();
    let mut rng = Pcg32::seed_from_u64(seed);
    log::info!("Campaign seed: {}", seed);

    loop {
        let Some(mission) = catalog.available_missions(&progress.completed_missions).next().cloned() else {
            break;
        };
        if !run_mission(&mission, &mut progress, &table, settings, &mut rng)? {
            log::warn!("Giving up on {}", mission.name);
            break;
        }
        progress.record_mission_complete(&mission);
        let payout = mission.roll_payout(&mut rng);
        progress.collect_reward(&mission, payout, false);

        let quests: Vec<_> = catalog
            .visible_side_quests(&progress.completed_missions, &progress.completed_side_quests)
            .cloned()
            .collect();
        for quest in quests {
            if run_mission(&quest.as_mission(), &mut progress, &table, settings, &mut rng)? {
                progress.complete_side_quest(&quest);
            }
        }

        // Loot goes straight to the fence
        while progress.sell_loot(0).is_some() {}
        go_shopping(&mut progress);
    }

    println!();
    println!("=== {} campaign ===", catalog.city);
    println!("Missions completed: {}/{}", progress.completed_missions.len(), catalog.missions.len());
    println!("Side quests:        {}", progress.completed_side_quests.len());
    println!("Puzzles solved:     {}", progress.stats.puzzles_solved);
    println!("Total earnings:     ${}", progress.stats.total_earnings);
    println!("Cash on hand:       ${}", progress.money);
    for tool in ToolKind::ALL {
        let state = progress.tools.get(tool);
        if state.owned {
            println!("  {:<20} lv {} x{}", tool.spec().name, state.level, state.quantity);
        }
    }
    Ok(())
}
