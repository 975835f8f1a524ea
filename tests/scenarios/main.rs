//! Scenario tests for build steps run through the step runner

mod helpers;

mod android_install;
mod host_resolution;
