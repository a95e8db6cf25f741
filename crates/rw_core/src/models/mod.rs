pub mod championship;
pub mod entrant;
pub mod results;
pub mod session;
pub mod weekend;

pub use championship::{Championship, ChampionshipClass};
pub use entrant::{entrants_from_results, EntrantCar, EntrantResult, SessionEntrant};
pub use results::{CollisionEvent, DriverResult, ResultsStore, SessionLap, SessionResults};
pub use session::{RaceConfig, Session, SessionType};
pub use weekend::{RaceWeekend, WeekendEntrant};
