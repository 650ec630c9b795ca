pub mod category;
pub mod clock;
pub mod money;
pub mod period;
pub mod row;
pub mod transaction;

pub use category::{CategoryMapper, MappingError, StandardCategory, TABLE_VERSION};
pub use clock::{Clock, FixedClock, SystemClock};
pub use money::Money;
pub use period::{PeriodError, YearMonth};
pub use row::RawRow;
pub use transaction::{CanonicalTransaction, LIABILITY_GROUP};
