pub mod server_routes;
