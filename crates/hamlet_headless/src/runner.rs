//! Interactive headless session.
//!
//! Reads JSON commands line by line, applies them to the engine, and
//! writes JSON responses. The loop is generic over its streams so tests
//! can drive it with in-memory buffers; `main` hands it stdin and stdout.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use hamlet_core::engine::Engine;
use hamlet_core::error::CommandError;

use crate::protocol::{
    describe_failure, Command, CostView, Event, JobView, PopulationView, QueueView, Response,
};
use crate::save::SaveFile;

/// Session configuration.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Output state after every tick command.
    pub auto_state: bool,
    /// Write a save here when the session ends.
    pub save_on_exit: Option<PathBuf>,
}

/// An interactive session wrapping one engine.
///
/// The session tick counts seconds simulated since the session opened;
/// it keeps counting across `load` and `reset`.
pub struct Session {
    engine: Engine,
    config: SessionConfig,
    ticks: u64,
}

impl Session {
    /// Create a session with default configuration.
    #[must_use]
    pub fn new(engine: Engine) -> Self {
        Self::with_config(engine, SessionConfig::default())
    }

    /// Create a session with custom configuration.
    #[must_use]
    pub fn with_config(engine: Engine, config: SessionConfig) -> Self {
        Self {
            engine,
            config,
            ticks: 0,
        }
    }

    /// Seconds simulated so far this session.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The wrapped engine.
    #[must_use]
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Run the session loop.
    ///
    /// Reads JSON commands from `input` and writes responses to `output`
    /// until the input ends or a `quit` command arrives. Unparseable lines
    /// and refused commands produce error responses, not a shutdown.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from the underlying streams.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, output: &mut W) -> io::Result<()> {
        write_response(output, &Response::ready(self.ticks))?;

        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let command = match Command::from_json(line) {
                Ok(cmd) => cmd,
                Err(e) => {
                    let error = Response::error(format!("parse error: {e}"), None);
                    write_response(output, &error)?;
                    continue;
                }
            };

            let quitting = matches!(command, Command::Quit);
            for response in self.handle(command) {
                write_response(output, &response)?;
            }
            if quitting {
                break;
            }
        }

        if let Some(path) = self.config.save_on_exit.clone() {
            match SaveFile::capture(&self.engine).save(&path) {
                Ok(()) => tracing::info!(path = %path.display(), "session saved"),
                Err(e) => tracing::error!(error = %e, "failed to save session"),
            }
        }
        Ok(())
    }

    /// Apply one command, producing the responses to write.
    fn handle(&mut self, command: Command) -> Vec<Response> {
        let name = command.name();
        match command {
            Command::Tick { count } => {
                let mut events = Vec::new();
                for _ in 0..count {
                    self.ticks += 1;
                    events.extend(self.engine.advance(1.0).iter().map(Event::from));
                }
                let mut responses = vec![Response::Events {
                    tick: self.ticks,
                    events,
                }];
                if self.config.auto_state {
                    responses.push(self.state_response());
                }
                responses
            }

            Command::Query => vec![self.state_response()],

            Command::Gather { resource } => {
                let result = self.engine.gather(&resource);
                unit_outcome(name, result)
            }

            Command::Build { building } => {
                let result = self.engine.start_building(&building);
                self.events_outcome(name, result)
            }

            Command::CancelBuild { index } => {
                let result = self.engine.cancel_building(index);
                self.events_outcome(name, result)
            }

            Command::Demolish { building } => {
                let pending = match self.engine.demolish_building(&building) {
                    Ok(pending) => pending,
                    Err(e) => return vec![Response::error(e.to_string(), Some(name))],
                };
                match self.engine.confirm_demolition(&pending) {
                    Ok(_) => vec![Response::Demolished {
                        building: pending.building,
                        refund: pending.refund,
                    }],
                    Err(e) => vec![Response::error(e.to_string(), Some(name))],
                }
            }

            Command::Assign { job } => {
                let result = self.engine.assign_worker(&job);
                unit_outcome(name, result)
            }

            Command::Unassign { job, force } => {
                let result = self.engine.unassign_worker(&job, force);
                unit_outcome(name, result)
            }

            Command::SupplyFood { food } => match self.engine.toggle_food_supply(&food) {
                Ok(enabled) => vec![Response::Toggled {
                    cmd: name.to_string(),
                    key: food,
                    enabled,
                }],
                Err(e) => vec![Response::error(e.to_string(), Some(name))],
            },

            Command::StockInn { good } => match self.engine.toggle_inn_supply(&good) {
                Ok(enabled) => vec![Response::Toggled {
                    cmd: name.to_string(),
                    key: good,
                    enabled,
                }],
                Err(e) => vec![Response::error(e.to_string(), Some(name))],
            },

            Command::Requirements { building } => {
                match self.engine.check_requirements(&building) {
                    Ok(report) => vec![Response::Requirements {
                        building,
                        passed: report.passed(),
                        failures: report.failures.iter().map(describe_failure).collect(),
                        cost: report
                            .cost
                            .iter()
                            .map(|line| CostView {
                                resource: line.resource.clone(),
                                required: line.required,
                                available: line.available,
                            })
                            .collect(),
                    }],
                    Err(e) => vec![Response::error(e.to_string(), Some(name))],
                }
            }

            Command::BuildTime { building } => {
                if self.engine.config().building(&building).is_none() {
                    let e = CommandError::UnknownBuilding { key: building };
                    return vec![Response::error(e.to_string(), Some(name))];
                }
                let time = self.engine.build_time(&building);
                vec![Response::BuildTime {
                    building,
                    base: time.base,
                    current: time.current,
                    builders: time.builders,
                    speed: time.speed,
                }]
            }

            Command::SettlerEta => {
                let eta = self.engine.next_settler_time();
                let state = self.engine.state();
                vec![Response::SettlerEta {
                    seconds_remaining: state.next_settler_in,
                    base: eta.base,
                    bonus: eta.bonus,
                    total: eta.total,
                    frozen: state.total_workers >= state.population_limit,
                }]
            }

            Command::Digest => vec![Response::Digest {
                tick: self.ticks,
                digest: self.engine.digest(),
            }],

            Command::Save { path } => match SaveFile::capture(&self.engine).save(&path) {
                Ok(()) => vec![Response::Saved { path }],
                Err(e) => vec![Response::error(e.to_string(), Some(name))],
            },

            Command::Load { path } => match SaveFile::load(&path) {
                Ok(save) => {
                    let (engine, notices) = save.restore(self.engine.config().clone());
                    self.engine = engine;
                    let mut responses = vec![Response::Loaded { path }];
                    if !notices.is_empty() {
                        responses.push(Response::Events {
                            tick: self.ticks,
                            events: notices.iter().map(Event::from).collect(),
                        });
                    }
                    responses
                }
                Err(e) => vec![Response::error(e.to_string(), Some(name))],
            },

            Command::Reset => {
                self.engine.reset();
                vec![Response::ack(name)]
            }

            Command::Quit => vec![Response::Bye],
        }
    }

    fn events_outcome(
        &self,
        name: &str,
        result: hamlet_core::error::Result<Vec<hamlet_core::notice::Notice>>,
    ) -> Vec<Response> {
        match result {
            Ok(notices) => vec![Response::Events {
                tick: self.ticks,
                events: notices.iter().map(Event::from).collect(),
            }],
            Err(e) => vec![Response::error(e.to_string(), Some(name))],
        }
    }

    fn state_response(&self) -> Response {
        let state = self.engine.state();
        let config = self.engine.config();

        let buildings = state
            .buildings
            .iter()
            .filter_map(|(key, building)| {
                let repeatable = config.building(key).is_some_and(|def| def.repeatable);
                let units = building.units(repeatable);
                (units > 0).then(|| (key.clone(), units))
            })
            .collect();

        let jobs = state
            .worker_slots
            .iter()
            .map(|(job, &slots)| {
                (
                    job.clone(),
                    JobView {
                        assigned: state.assigned(job),
                        slots,
                    },
                )
            })
            .collect();

        let queue = state
            .build_queue
            .iter()
            .map(|entry| QueueView {
                building: entry.building.clone(),
                progress: entry.progress,
                total: entry.total_time,
            })
            .collect();

        Response::State {
            tick: self.ticks,
            tier: state.tier.clone(),
            population: PopulationView {
                workers: state.total_workers,
                idle: state.total_workers - state.assigned_total(),
                limit: state.population_limit,
                worker_limit: state.worker_limit,
                next_settler_in: state.next_settler_in,
            },
            production_halted: state.production_halted,
            resources: state.resources.clone(),
            buildings,
            jobs,
            queue,
            digest: self.engine.digest(),
        }
    }
}

fn unit_outcome(name: &str, result: hamlet_core::error::Result<()>) -> Vec<Response> {
    match result {
        Ok(()) => vec![Response::ack(name)],
        Err(e) => vec![Response::error(e.to_string(), Some(name))],
    }
}

fn write_response<W: Write>(output: &mut W, response: &Response) -> io::Result<()> {
    output.write_all(response.to_json_line().as_bytes())?;
    output.flush()
}
