pub mod stellar_address;
