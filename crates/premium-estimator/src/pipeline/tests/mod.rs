mod alignment;
mod common;
mod routing;
