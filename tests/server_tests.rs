//! End-to-end tests over TCP
//!
//! These tests verify:
//! - The request/response record protocol, one response per request
//! - Error responses keep the connection usable; bad commands close it
//! - Durability across a full server restart on the same log
//! - Concurrent clients against the shared store
//! - Shutdown sequencing (accept loop, handlers, log worker)

use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arborkv::network::Server;
use arborkv::{ArborError, Client, Config, Engine};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn server_config(dir: &TempDir) -> Config {
    Config::builder()
        .log_path(dir.path().join("db.csv"))
        .listen_addr("127.0.0.1:0")
        .build()
}

fn start_server(config: Config) -> (Arc<Server>, JoinHandle<arborkv::Result<()>>, SocketAddr) {
    let engine = Arc::new(Engine::open(&config).unwrap());
    let server = Arc::new(Server::new(config, engine));

    let runner = Arc::clone(&server);
    let handle = thread::spawn(move || runner.run());

    let addr = wait_for_bind(&server);
    (server, handle, addr)
}

fn wait_for_bind(server: &Server) -> SocketAddr {
    for _ in 0..200 {
        if let Some(addr) = server.local_addr() {
            return addr;
        }
        thread::sleep(Duration::from_millis(10));
    }
    panic!("server did not bind a listener");
}

fn stop_server(server: Arc<Server>, handle: JoinHandle<arborkv::Result<()>>) {
    server.shutdown();
    handle.join().unwrap().unwrap();
}

// =============================================================================
// Protocol Tests
// =============================================================================

#[test]
fn get_and_set_over_the_wire() {
    let dir = TempDir::new().unwrap();
    let (server, handle, addr) = start_server(server_config(&dir));

    {
        let mut client = Client::connect(addr).unwrap();

        // A read before any write reports the key miss.
        let err = client.get(&["a"]).unwrap_err();
        assert!(err.to_string().contains("top-level key miss a"));

        client.set(&["a", "b"]).unwrap();
        assert_eq!(client.get(&["a"]).unwrap(), "b");

        client.set(&["mapkey", "key", "value"]).unwrap();
        assert_eq!(client.get(&["mapkey", "key"]).unwrap(), "value");

        client.append("ap", "apa").unwrap();
        client.append("ap", "apb").unwrap();
        assert_eq!(client.get_list("ap").unwrap(), vec!["apa", "apb"]);

        // Scalar and map-only values read as empty lists.
        assert!(client.get_list("a").unwrap().is_empty());
        assert!(client.get_list("mapkey").unwrap().is_empty());
    }

    stop_server(server, handle);
}

#[test]
fn error_response_keeps_connection_usable() {
    let dir = TempDir::new().unwrap();
    let (server, handle, addr) = start_server(server_config(&dir));

    {
        let mut client = Client::connect(addr).unwrap();

        // Missing payload: an error response, then the connection works on.
        let err = client.set(&["a"]).unwrap_err();
        assert!(err.to_string().contains("set command requires 2 arguments"));

        client.set(&["a", "b"]).unwrap();
        assert_eq!(client.get(&["a"]).unwrap(), "b");

        // Evaluation errors behave the same way.
        let err = client.get(&["a", "+", "3"]).unwrap_err();
        assert!(err.to_string().contains("index request out of range"));
        assert_eq!(client.get(&["a"]).unwrap(), "b");
    }

    stop_server(server, handle);
}

#[test]
fn raw_records_alternate_one_response_per_request() {
    let dir = TempDir::new().unwrap();
    let (server, handle, addr) = start_server(server_config(&dir));

    {
        let stream = TcpStream::connect(addr).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(stream.try_clone().unwrap());
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(stream);

        writer.write_record(["set", "a"]).unwrap();
        writer.flush().unwrap();
        let mut record = csv::StringRecord::new();
        assert!(reader.read_record(&mut record).unwrap());
        assert_eq!(record.get(0), Some("error"));

        writer.write_record(["set", "a", "b"]).unwrap();
        writer.flush().unwrap();
        assert!(reader.read_record(&mut record).unwrap());
        assert_eq!(record.get(0), Some("ok"));

        writer.write_record(["get", "a"]).unwrap();
        writer.flush().unwrap();
        assert!(reader.read_record(&mut record).unwrap());
        assert_eq!(record.get(0), Some("ok"));
        assert_eq!(record.get(1), Some("b"));
    }

    stop_server(server, handle);
}

#[test]
fn bad_command_answers_then_closes() {
    let dir = TempDir::new().unwrap();
    let (server, handle, addr) = start_server(server_config(&dir));

    {
        let stream = TcpStream::connect(addr).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(stream.try_clone().unwrap());
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(stream);

        writer.write_record(["bogus", "a"]).unwrap();
        writer.flush().unwrap();

        let mut record = csv::StringRecord::new();
        assert!(reader.read_record(&mut record).unwrap());
        assert_eq!(record.get(0), Some("error"));
        assert_eq!(record.get(1), Some("bad_command"));
        assert_eq!(record.get(2), Some("bogus"));

        // The handler closed the connection after that one response.
        assert!(!reader.read_record(&mut record).unwrap());
    }

    stop_server(server, handle);
}

#[test]
fn payloads_with_separators_round_trip() {
    let dir = TempDir::new().unwrap();
    let (server, handle, addr) = start_server(server_config(&dir));

    {
        let mut client = Client::connect(addr).unwrap();
        client.set(&["k", "a,b \"quoted\"\nnext"]).unwrap();
        assert_eq!(client.get(&["k"]).unwrap(), "a,b \"quoted\"\nnext");
    }

    stop_server(server, handle);
}

// =============================================================================
// Durability Tests
// =============================================================================

#[test]
fn values_survive_a_server_restart() {
    let dir = TempDir::new().unwrap();

    let (server, handle, addr) = start_server(server_config(&dir));
    {
        let mut client = Client::connect(addr).unwrap();
        client.set(&["a", "c"]).unwrap();
        client.set(&["users", "alice", "role", "admin"]).unwrap();
        client.append("ap", "apa").unwrap();
        client.append("ap", "apb").unwrap();
    }
    stop_server(server, handle);

    let (server, handle, addr) = start_server(server_config(&dir));
    {
        let mut client = Client::connect(addr).unwrap();
        assert_eq!(client.get(&["a"]).unwrap(), "c");
        assert_eq!(client.get(&["users", "alice", "role"]).unwrap(), "admin");
        assert_eq!(client.get_list("ap").unwrap(), vec!["apa", "apb"]);
    }
    stop_server(server, handle);
}

#[test]
fn overwrite_config_drops_previous_state() {
    let dir = TempDir::new().unwrap();

    let (server, handle, addr) = start_server(server_config(&dir));
    {
        let mut client = Client::connect(addr).unwrap();
        client.set(&["a", "b"]).unwrap();
    }
    stop_server(server, handle);

    let config = Config::builder()
        .log_path(dir.path().join("db.csv"))
        .listen_addr("127.0.0.1:0")
        .overwrite(true)
        .build();
    let (server, handle, addr) = start_server(config);
    {
        let mut client = Client::connect(addr).unwrap();
        let err = client.get(&["a"]).unwrap_err();
        assert!(matches!(err, ArborError::Remote(_)));
    }
    stop_server(server, handle);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn concurrent_clients_share_the_store() {
    let dir = TempDir::new().unwrap();
    let (server, handle, addr) = start_server(server_config(&dir));

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            thread::spawn(move || {
                let key = format!("list{worker}");
                let mut client = Client::connect(addr).unwrap();
                for i in 0..25 {
                    client.append(&key, &format!("item{i}")).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    {
        let mut client = Client::connect(addr).unwrap();
        for worker in 0..4 {
            let values = client.get_list(&format!("list{worker}")).unwrap();
            let expected: Vec<String> = (0..25).map(|i| format!("item{i}")).collect();
            assert_eq!(values, expected, "list{worker} lost or reordered appends");
        }
    }

    stop_server(server, handle);
}
