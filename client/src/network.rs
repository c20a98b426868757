use crate::error::{ClientError, Result};
use crate::game::ClientGameState;
use crate::input::{self, Command, HELP};
use crate::rendering::{render_message, render_results, render_room};
use crate::resend::ResendTracker;
use crate::storage::SessionCache;
use log::{debug, error, info, warn};
use shared::frame::{read_frame, write_frame, FrameError};
use shared::{FinalAnswer, Packet, PlayerId, PROTOCOL_VERSION};
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

/// A handshaken connection to the room server
pub struct Connection {
    client_id: PlayerId,
    writer: OwnedWriteHalf,
    incoming: mpsc::UnboundedReceiver<std::result::Result<Packet, FrameError>>,
    reader: JoinHandle<()>,
}

impl Connection {
    /// Connects and performs the version handshake
    pub async fn open(server_addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(server_addr).await?;
        stream.set_nodelay(true)?;
        let (mut reader, mut writer) = stream.into_split();

        write_frame(
            &mut writer,
            &Packet::Connect {
                client_version: PROTOCOL_VERSION,
            },
        )
        .await?;

        let client_id = match read_frame(&mut reader).await? {
            Packet::Connected { client_id } => client_id,
            Packet::Disconnected { reason } => return Err(ClientError::Rejected(reason)),
            other => return Err(ClientError::Handshake(other.name())),
        };

        let (tx, incoming) = mpsc::unbounded_channel();
        let reader = tokio::spawn(async move {
            loop {
                let result = read_frame(&mut reader).await;
                let fatal = matches!(&result, Err(e) if !e.is_recoverable());
                if tx.send(result).is_err() || fatal {
                    break;
                }
            }
        });

        Ok(Self {
            client_id,
            writer,
            incoming,
            reader,
        })
    }

    pub fn client_id(&self) -> PlayerId {
        self.client_id
    }

    pub async fn send(&mut self, packet: &Packet) -> Result<()> {
        debug!("Sending {}", packet.name());
        write_frame(&mut self.writer, packet).await?;
        Ok(())
    }

    /// Next packet from the server. None once the connection is gone.
    pub async fn recv(&mut self) -> Option<std::result::Result<Packet, FrameError>> {
        self.incoming.recv().await
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Interactive terminal client
pub struct Client {
    connection: Connection,
    name: String,
    room_code: Option<String>,
    state: ClientGameState,
    cache: SessionCache,
    resend: ResendTracker,
    rejoining: bool,
}

impl Client {
    pub async fn new(
        server_addr: &str,
        name: String,
        room_code: Option<String>,
        cache: SessionCache,
    ) -> Result<Self> {
        let connection = Connection::open(server_addr).await?;
        info!("Connected! Client ID: {}", connection.client_id());

        Ok(Client {
            connection,
            name,
            room_code,
            state: ClientGameState::new(),
            cache,
            resend: ResendTracker::default(),
            rejoining: false,
        })
    }

    /// The first room request: rejoin a cached game, join the requested
    /// room, or create a new one. An explicit room other than the cached
    /// one wins over the cache.
    fn opening_request(&mut self) -> Packet {
        let cached = self.cache.session().filter(|(room, _)| {
            self.room_code
                .as_deref()
                .map_or(true, |code| code.trim().eq_ignore_ascii_case(&room.code))
        });

        if let Some((room, player)) = cached {
            info!("Rejoining room {} as {}", room.code, player.name);
            self.rejoining = true;
            return Packet::JoinRoom {
                room_code: room.code,
                player_name: player.name,
            };
        }

        match &self.room_code {
            Some(code) => Packet::JoinRoom {
                room_code: code.clone(),
                player_name: self.name.clone(),
            },
            None => Packet::CreateRoom {
                player_name: self.name.clone(),
            },
        }
    }

    /// Replacement request when the automatic rejoin is refused. The stale
    /// session is dropped so later launches do not retry it.
    fn rejoin_failed(&mut self, packet: &Packet) -> Option<Packet> {
        if !self.rejoining {
            return None;
        }
        match packet {
            Packet::Error { message } => {
                self.rejoining = false;
                warn!("Could not rejoin cached room: {}", message);
                if let Err(e) = self.cache.clear() {
                    warn!("Failed to clear cached session: {}", e);
                }
                Some(self.opening_request())
            }
            Packet::RoomJoined { .. } => {
                self.rejoining = false;
                None
            }
            _ => None,
        }
    }

    async fn send_action(&mut self, packet: Packet) -> Result<()> {
        self.connection.send(&packet).await?;
        self.state.predict(&packet);
        if let Some(phase) = self.state.phase() {
            self.resend.track(&packet, phase, Instant::now());
        }
        Ok(())
    }

    fn persist_session(&self) {
        let saved = match (self.state.confirmed.as_ref(), self.state.me()) {
            (Some(room), Some(me)) => self.cache.save_session(room, me),
            _ => Ok(()),
        };
        if let Err(e) = saved {
            warn!("Failed to cache session: {}", e);
        }
    }

    fn handle_packet(&mut self, packet: Packet) -> bool {
        self.state.apply(&packet);

        match &packet {
            Packet::RoomCreated { room, .. } => {
                println!("Created room {}. Share the code to invite players.", room.code);
                println!("{}", render_room(room, self.state.player_id));
                self.persist_session();
            }
            Packet::RoomJoined { room, .. } => {
                println!("Joined room {}.", room.code);
                println!("{}", render_room(room, self.state.player_id));
                self.persist_session();
            }
            Packet::RoomUpdated { .. } => {
                self.persist_session();
            }
            Packet::GameStarted => println!("The game has started."),
            Packet::RoleAssigned { role, disease } => match disease {
                Some(disease) => println!("You are {}. The disease is {}.", role, disease),
                None => println!("You are {}. You do not know the disease.", role),
            },
            Packet::PhaseChanged { .. } => {
                if let Some(room) = self.state.view() {
                    println!("{}", render_room(&room, self.state.player_id));
                }
            }
            Packet::PlayerEliminated { player_id } => {
                if Some(*player_id) == self.state.player_id {
                    println!("You have been eliminated.");
                }
            }
            Packet::VoteRecorded { .. } | Packet::FinalVoteRecorded { .. } => {
                println!("Vote recorded.");
            }
            Packet::FinalAnswerSubmitted { .. } => println!("Final answer locked in."),
            Packet::ChatMessage { message } => println!("{}", render_message(message)),
            Packet::GameEnded { results } => {
                println!("{}", render_results(results));
                self.resend.clear();
                if let Err(e) = self.cache.store_results(results) {
                    warn!("Failed to cache results: {}", e);
                }
            }
            Packet::Error { message } => {
                eprintln!("Error: {}", message);
            }
            Packet::Pong => {}
            Packet::Disconnected { reason } => {
                warn!("Disconnected: {}", reason);
                return false;
            }
            other => warn!("Unexpected packet {}", other.name()),
        }
        true
    }

    fn target(&self, who: &str) -> Result<PlayerId> {
        let room = self
            .state
            .confirmed
            .as_ref()
            .ok_or_else(|| ClientError::InvalidCommand("You are not in a room".to_string()))?;
        input::resolve_target(room, who)
    }

    /// Runs one command. Returns false to quit.
    async fn handle_command(&mut self, command: Command) -> Result<bool> {
        let packet = match command {
            Command::Create { name } => Packet::CreateRoom {
                player_name: name.unwrap_or_else(|| self.name.clone()),
            },
            Command::Join { code, name } => Packet::JoinRoom {
                room_code: code,
                player_name: name.unwrap_or_else(|| self.name.clone()),
            },
            Command::Start => Packet::StartGame,
            Command::Reveal => Packet::RevealRole,
            Command::Chat(message) => Packet::SendChat { message },
            Command::Answer(answer) => Packet::SubmitAnswer { answer },
            Command::Vote(who) => Packet::VotePlayer {
                target_id: self.target(&who)?,
            },
            Command::FinalAnswer {
                treatment,
                innovation,
            } => Packet::SubmitFinalAnswer {
                answer: FinalAnswer {
                    treatment,
                    innovation,
                },
            },
            Command::FinalVote(who) => Packet::VoteFinal {
                target_id: self.target(&who)?,
            },
            Command::Leave => {
                self.connection.send(&Packet::LeaveRoom).await?;
                self.state.leave();
                self.resend.clear();
                self.cache.clear()?;
                println!("Left the room.");
                return Ok(true);
            }
            Command::Status => {
                match self.state.view() {
                    Some(room) => println!("{}", render_room(&room, self.state.player_id)),
                    None => println!("Not in a room."),
                }
                if let (Some(role), Some(phase)) = (self.state.role, self.state.phase()) {
                    if phase.in_progress() {
                        println!("Your role: {}", role);
                    }
                }
                return Ok(true);
            }
            Command::Help => {
                println!("{}", HELP);
                return Ok(true);
            }
            Command::Quit => return Ok(false),
        };

        self.send_action(packet).await?;
        Ok(true)
    }

    pub async fn run(&mut self) -> Result<()> {
        let opening = self.opening_request();
        self.connection.send(&opening).await?;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut resend_interval = interval(Duration::from_millis(500));
        let mut ping_interval = interval(Duration::from_secs(10));

        loop {
            tokio::select! {
                incoming = self.connection.recv() => {
                    match incoming {
                        Some(Ok(packet)) => {
                            if let Some(retry) = self.rejoin_failed(&packet) {
                                self.connection.send(&retry).await?;
                            }
                            if !self.handle_packet(packet) {
                                break;
                            }
                        }
                        Some(Err(e)) if e.is_recoverable() => {
                            warn!("Dropped undecodable packet: {}", e);
                        }
                        Some(Err(e)) => {
                            error!("Connection lost: {}", e);
                            break;
                        }
                        None => break,
                    }
                },

                line = lines.next_line() => {
                    let line = match line? {
                        Some(line) => line,
                        None => break,
                    };
                    let command = match input::parse(&line) {
                        Ok(Some(command)) => command,
                        Ok(None) => continue,
                        Err(e) => {
                            eprintln!("{}", e);
                            continue;
                        }
                    };
                    match self.handle_command(command).await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(ClientError::InvalidCommand(msg)) => eprintln!("{}", msg),
                        Err(e) => return Err(e),
                    }
                },

                _ = resend_interval.tick() => {
                    if let Some(me) = self.state.player_id {
                        let due = self.resend.due(self.state.confirmed.as_ref(), me, Instant::now());
                        if let Some(packet) = due {
                            debug!("Resending {}", packet.name());
                            self.connection.send(&packet).await?;
                        }
                    }
                },

                _ = ping_interval.tick() => {
                    self.connection.send(&Packet::Ping).await?;
                },
            }
        }

        let _ = self.connection.send(&Packet::Disconnect).await;
        Ok(())
    }
}
