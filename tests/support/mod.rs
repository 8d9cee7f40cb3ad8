//! Local HTTP server handing out fixture keys.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

use tokio::sync::oneshot;
use warp::http::StatusCode;
use warp::Filter;

pub const SINGLE: &str = include_str!("../fixtures/single.asc");
pub const MULTI: &str = include_str!("../fixtures/multi.asc");
pub const EMPTY: &str = include_str!("../fixtures/empty.asc");
pub const BINARY: &[u8] = include_bytes!("../fixtures/single.gpg");
pub const SINGLE_FINGERPRINT: &str = "120D2C02F7B9FC8063F0CF1D45EF07C235FB931D";

/// Serves:
/// - `/single.asc`: one armored key
/// - `/multi.asc`: two armored keys
/// - `/empty.asc`: an armored block with no keys
/// - `/single.gpg`: the first key, binary
/// - `/missing.asc`: 404
/// - `/broken.asc`: 500
pub struct KeyServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
}

impl KeyServer {
    pub fn start() -> Self {
        let single = warp::path!("single.asc").map(|| SINGLE);
        let multi = warp::path!("multi.asc").map(|| MULTI);
        let empty = warp::path!("empty.asc").map(|| EMPTY);
        let binary = warp::path!("single.gpg").map(|| BINARY.to_vec());
        let missing = warp::path!("missing.asc")
            .map(|| warp::reply::with_status("no such key", StatusCode::NOT_FOUND));
        let broken = warp::path!("broken.asc")
            .map(|| warp::reply::with_status("boom", StatusCode::INTERNAL_SERVER_ERROR));

        let routes = warp::get().and(
            single
                .or(multi)
                .or(empty)
                .or(binary)
                .or(missing)
                .or(broken),
        );

        let (addr_tx, addr_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("test runtime");

            runtime.block_on(async move {
                let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(
                    ([127, 0, 0, 1], 0),
                    async {
                        let _ = shutdown_rx.await;
                    },
                );
                addr_tx.send(addr).expect("report server address");
                server.await;
            });
        });

        let addr = addr_rx.recv().expect("key server failed to start");
        Self {
            addr,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}/{}", self.addr, path)
    }
}

impl Drop for KeyServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
