pub mod cli_args;
mod error;
mod extractor;
mod middleware;
mod route;
pub mod server;
mod state;
mod store;

#[cfg(test)]
mod test;
