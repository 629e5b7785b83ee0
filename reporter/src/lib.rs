pub mod listener_service;
