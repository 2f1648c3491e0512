mod common;
mod convertor;
mod resolver;
mod support;
