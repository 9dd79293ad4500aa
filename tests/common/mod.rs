pub mod drive_server;
