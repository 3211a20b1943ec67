use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use kvcore_engine::{Dispatcher, Engine};
use kvcore_vfs::Filesystem;
use tracing::{info, instrument, warn};

/// Serves the dispatcher's wire protocol over TCP: one accept loop, one
/// thread per connection, each running [`Dispatcher::handle_one`] until
/// the peer disconnects or a transport error occurs. A production
/// deployment choosing to host many connections per OS thread would swap
/// this for tasks on a `kvcore-runtime` `Runtime`; a thread per connection
/// is simpler and sufficient to exercise the dispatcher end-to-end.
#[instrument(skip(engine), fields(%listen_addr))]
pub(crate) fn serve<F>(engine: Arc<Engine<F>>, listen_addr: &str) -> std::io::Result<()>
where
    F: Filesystem + Send + Sync + 'static,
{
    let listener = TcpListener::bind(listen_addr)?;
    info!("listening");

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "failed to accept a connection");
                continue;
            }
        };
        let engine = Arc::clone(&engine);
        thread::spawn(move || handle_connection(&engine, stream));
    }
    Ok(())
}

#[instrument(skip(engine, stream), fields(peer = ?stream.peer_addr().ok()))]
fn handle_connection<F: Filesystem>(engine: &Engine<F>, mut stream: TcpStream) {
    let dispatcher = Dispatcher::new(engine);
    let mut writer = match stream.try_clone() {
        Ok(writer) => writer,
        Err(err) => {
            warn!(error = %err, "failed to clone connection for writing, dropping it");
            return;
        }
    };
    loop {
        match dispatcher.handle_one(&mut stream, &mut writer) {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                warn!(error = %err, "connection I/O error, closing it");
                break;
            }
        }
    }
}
