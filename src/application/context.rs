use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::CredentialPersistence;
use crate::domain::services::CacheSync;
use crate::domain::services::CredentialStore;
use crate::domain::services::StreamingConsumer;
use crate::infrastructure::api::AuthApi;
use crate::infrastructure::api::ChatsApi;
use crate::infrastructure::api::ModelsApi;
use crate::infrastructure::gateway::Gateway;
use crate::infrastructure::persistence::FileCredentials;

pub struct ContextOptions {
    pub api_url: String,
    pub request_timeout: Duration,
    pub stream_idle_timeout: Duration,
    pub messages_page_size: u32,
    pub chats_page_size: u32,
}

impl ContextOptions {
    pub fn from_config() -> Result<ContextOptions> {
        return Ok(ContextOptions {
            api_url: Config::get(ConfigKey::ApiUrl),
            request_timeout: Config::get_millis(ConfigKey::RequestTimeout),
            stream_idle_timeout: Config::get_millis(ConfigKey::StreamIdleTimeout),
            messages_page_size: u32::try_from(Config::get_number(ConfigKey::MessagesPageSize))?,
            chats_page_size: u32::try_from(Config::get_number(ConfigKey::ChatsPageSize))?,
        });
    }
}

/// Everything a command needs, wired around one shared gateway.
pub struct AppContext {
    pub gateway: Arc<Gateway>,
    pub auth: AuthApi,
    pub chats: Arc<ChatsApi>,
    pub models: ModelsApi,
    pub cache: Arc<CacheSync>,
    pub consumer: StreamingConsumer,
    pub chats_page_size: u32,
}

impl AppContext {
    pub fn new(
        opts: ContextOptions,
        persistence: Box<dyn CredentialPersistence>,
    ) -> Result<AppContext> {
        let credentials = Arc::new(CredentialStore::load(persistence)?);
        let gateway = Arc::new(Gateway::new(&opts.api_url, credentials));
        let timeout = Some(opts.request_timeout);

        let chats = Arc::new(ChatsApi::new(gateway.clone(), timeout));
        let cache = Arc::new(CacheSync::new(
            chats.clone(),
            opts.messages_page_size,
            opts.chats_page_size,
        ));
        let consumer =
            StreamingConsumer::new(gateway.clone(), cache.clone(), opts.stream_idle_timeout);

        return Ok(AppContext {
            auth: AuthApi::new(gateway.clone(), timeout),
            models: ModelsApi::new(gateway.clone(), timeout),
            gateway,
            chats,
            cache,
            consumer,
            chats_page_size: opts.chats_page_size,
        });
    }

    pub fn from_config() -> Result<AppContext> {
        return AppContext::new(
            ContextOptions::from_config()?,
            Box::<FileCredentials>::default(),
        );
    }
}
