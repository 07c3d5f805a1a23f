pub mod grovepi;
