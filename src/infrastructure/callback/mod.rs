mod callback_payload;
mod http_callback_dispatcher;

pub use callback_payload::CallbackPayload;
pub use http_callback_dispatcher::HttpCallbackDispatcher;
