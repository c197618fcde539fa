/*
 * Dataset Finder: counts the dataset-metadata records of a JSON catalog that
 * match a theme selection and optional granularity, spatial-scope and year
 * constraints. `core` holds the platform-agnostic model and query engine;
 * `app_logic` drives it from form events.
 */
pub mod app_logic;
pub mod core;
