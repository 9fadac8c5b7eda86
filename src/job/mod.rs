pub mod reconcile_job;
