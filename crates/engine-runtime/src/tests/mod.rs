mod lifecycle;
mod strategy;
mod support;
