pub mod init;
pub mod prerender;
pub mod seo;
pub mod serve;
pub mod validate;
