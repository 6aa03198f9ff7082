//! Fluent builder for constructing a [`Simulation`].

use sprint_core::{Role, SimConfig, SimRng, WorkerId, WorkerRng};
use sprint_schedule::{CustomEvents, WorkerCalendar};
use sprint_workflow::{RandomTicketGenerator, TicketGenerator, WorkflowRouter};

use crate::{SimError, SimResult, Simulation, Worker};

/// Seed offsets for the independent RNG streams derived from the master seed.
const GENERATOR_STREAM: u64 = 0;
const PROJECTOR_STREAM: u64 = 1;

/// Fluent builder for [`Simulation`].
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                                  |
/// |-----------------------|------------------------------------------|
/// | `.generator(g)`       | `RandomTicketGenerator` from the config  |
/// | `.custom_events(e)`   | No extra meetings                        |
///
/// # Example
///
/// ```rust,ignore
/// let events = load_custom_events_csv("meetings.csv", 6, 12)?;
/// let mut sim = SimBuilder::new(config)
///     .custom_events(events)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:        SimConfig,
    generator:     Option<Box<dyn TicketGenerator>>,
    custom_events: Option<CustomEvents>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self { config, generator: None, custom_events: None }
    }

    /// Supply the source of new tickets.
    pub fn generator(mut self, generator: impl TicketGenerator + 'static) -> Self {
        self.generator = Some(Box::new(generator));
        self
    }

    /// Supply extra meetings: one list per worker (programmers first), each
    /// holding one list of events per simulated day.
    pub fn custom_events(mut self, events: CustomEvents) -> Self {
        self.custom_events = Some(events);
        self
    }

    /// Validate inputs and construct the [`Simulation`].
    pub fn build(self) -> SimResult<Simulation> {
        let config = self.config;
        config.validate()?;

        let worker_count = config.worker_count() as usize;
        if let Some(events) = &self.custom_events {
            if events.len() != worker_count {
                return Err(SimError::ConfigurationMismatch {
                    expected: worker_count,
                    got:      events.len(),
                    what:     "custom event lists",
                });
            }
        }

        let mut root = SimRng::new(config.seed);
        let generator: Box<dyn TicketGenerator> = match self.generator {
            Some(g) => g,
            None => Box::new(RandomTicketGenerator::new(&config, root.child(GENERATOR_STREAM))?),
        };
        let projector_rng = root.child(PROJECTOR_STREAM);

        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..config.worker_count() {
            let (role, n) = if i < config.programmer_count {
                (Role::Programmer, i + 1)
            } else {
                (Role::Tester, i - config.programmer_count + 1)
            };
            let id = WorkerId(i);
            let custom = self.custom_events.as_ref().map(|e| e[i as usize].as_slice());
            let calendar = WorkerCalendar::new(&config, role, custom)?;
            let name = match role {
                Role::Programmer => format!("Programmer #{n}"),
                Role::Tester => format!("Tester #{n}"),
            };
            workers.push(Worker::new(id, role, name, calendar, WorkerRng::new(config.seed, id)));
        }

        let router = WorkflowRouter::new(config.programmer_count);
        Ok(Simulation::new(config, workers, router, generator, projector_rng))
    }
}
