//! 분할 주문 알고리즘의 핵심 구현체

pub mod canceller;
pub mod distribution;
pub mod precision;
pub mod submitter;
pub mod volume_splitter;

pub use canceller::OpenOrderCanceller;
pub use distribution::{OrderDraft, VolumeDistribution};
pub use precision::{PrecisionResolver, SymbolPrecision};
pub use submitter::{NoopObserver, OrderAction, OrderObserver, OrderSubmitter};
pub use volume_splitter::VolumeSplitter;
