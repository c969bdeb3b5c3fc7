use crate::FrameError;

/// The twelve frame kinds defined by the protocol (§6 of the wire format).
///
/// The numbering is not sequential — `DistortReq` is `0x10`, not the `0x0A`
/// a contiguous enum would produce — because it is load-bearing on the wire
/// and must match every other implementation of this protocol.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// `Fleck -> Gotham`: client requests registration.
    ConnectReq = 0x01,
    /// `Worker -> Gotham`: worker requests registration.
    WorkerReg = 0x02,
    /// `Fleck -> Worker`: client opens a distortion session.
    WorkerConnect = 0x03,
    /// `Worker -> Fleck`: worker reports the result size and checksum.
    FileInfo = 0x04,
    /// Either direction: a chunk of file bytes.
    FileData = 0x05,
    /// Either direction: integrity verdict after a transfer.
    Md5Check = 0x06,
    /// Either direction: graceful session/connection teardown.
    Disconnect = 0x07,
    /// `Gotham -> Worker`: the worker has been elected primary.
    NewMain = 0x08,
    /// Either direction: a protocol-level failure.
    Error = 0x09,
    /// `Fleck -> Gotham`: request a worker for a media class.
    DistortReq = 0x10,
    /// `Fleck -> Gotham`: request a fresh worker after one died mid-session.
    ResumeReq = 0x11,
    /// Either direction: liveness probe.
    Heartbeat = 0x12,
}

impl MessageType {
    /// All message types, in wire-value order.
    pub const ALL: [MessageType; 12] = [
        MessageType::ConnectReq,
        MessageType::WorkerReg,
        MessageType::WorkerConnect,
        MessageType::FileInfo,
        MessageType::FileData,
        MessageType::Md5Check,
        MessageType::Disconnect,
        MessageType::NewMain,
        MessageType::Error,
        MessageType::DistortReq,
        MessageType::ResumeReq,
        MessageType::Heartbeat,
    ];

    /// The raw byte value of this message type as it appears on the wire.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageType {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        for candidate in MessageType::ALL {
            if candidate.as_u8() == value {
                return Ok(candidate);
            }
        }
        Err(FrameError::UnknownType(value))
    }
}
