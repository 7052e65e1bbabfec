/*
Edge controller agent.

On start the agent holds at most one bootstrap credential (an enrollment
token from the environment). A background loop drives registration with
the cloud and, once registered, keeps pulling the site's desired
configuration at a fixed interval. A small local HTTP API reports the
current state and serves dummy telemetry points.
*/

pub mod agent;
pub mod api;
pub mod cli;
pub mod cloud;
pub mod config;
