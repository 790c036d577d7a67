use std::sync::Arc;

use crate::{
    auth::{JwtService, UrlSigner},
    config::Config,
    services::{FileService, QuotaLedger},
    storage::ObjectStore,
};

pub mod docs;
pub mod files;
pub mod health;
pub mod storage;
pub mod webhook;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<dyn QuotaLedger>,
    pub objects: Arc<dyn ObjectStore>,
    pub files: Arc<FileService>,
    pub jwt: Arc<JwtService>,
    pub signer: Arc<UrlSigner>,
}

impl AppState {
    pub fn new(config: Config, ledger: Arc<dyn QuotaLedger>, objects: Arc<dyn ObjectStore>) -> Self {
        let jwt = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));
        let signer = Arc::new(UrlSigner::new(
            &config.jwt_secret,
            &config.public_base_url,
            config.signed_url_ttl_secs,
        ));
        let files = Arc::new(FileService::new(
            objects.clone(),
            ledger.clone(),
            signer.clone(),
            config.list_limit,
        ));

        Self {
            config: Arc::new(config),
            ledger,
            objects,
            files,
            jwt,
            signer,
        }
    }
}
