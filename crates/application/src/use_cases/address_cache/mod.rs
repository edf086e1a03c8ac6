mod refresh;

pub use refresh::{AddressCacheRefreshOutcome, RefreshAddressCacheUseCase};
