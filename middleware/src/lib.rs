//! Middleware around a turn: the context lifecycle and request logging.

mod context_middleware;
mod middleware;

#[cfg(test)]
mod test;

pub use context_middleware::ContextMiddleware;
pub use middleware::LoggingMiddleware;
