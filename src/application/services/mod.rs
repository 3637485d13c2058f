pub mod cover_resolver;

pub use cover_resolver::CoverResolver;
