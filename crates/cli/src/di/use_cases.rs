use ddns_application::services::DdnsState;
use ddns_application::use_cases::{
    ApplyRegistrationUseCase, RefreshAddressCacheUseCase, ResolveDnsQueryUseCase,
    SyncHostMapUseCase,
};
use ddns_domain::Config;
use ddns_infrastructure::system::PlatformAddressLookup;
use std::sync::Arc;

pub struct UseCases {
    pub resolve_query: Arc<ResolveDnsQueryUseCase>,
    pub apply_registration: Arc<ApplyRegistrationUseCase>,
    pub sync_host_map: Arc<SyncHostMapUseCase>,
    pub refresh_address_cache: Arc<RefreshAddressCacheUseCase>,
}

impl UseCases {
    pub fn new(config: &Config, state: &Arc<DdnsState>) -> Self {
        let ddns = &config.ddns;
        Self {
            resolve_query: Arc::new(
                ResolveDnsQueryUseCase::new(
                    Arc::clone(state),
                    ddns.response_ttl_secs,
                    config.soa.clone(),
                )
                .with_unresolved_logging(ddns.log_unresolved),
            ),
            apply_registration: Arc::new(ApplyRegistrationUseCase::new(
                Arc::clone(state),
                ddns.message_ttl(),
                ddns.registration_ttl(),
            )),
            sync_host_map: Arc::new(SyncHostMapUseCase::new(Arc::clone(state), ddns.mode)),
            refresh_address_cache: Arc::new(RefreshAddressCacheUseCase::new(
                Arc::clone(state),
                Arc::new(PlatformAddressLookup::default()),
            )),
        }
    }
}
