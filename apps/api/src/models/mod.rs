pub mod job_profile;
