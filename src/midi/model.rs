use crate::extensions::option::OptionExt;

use serde::de::{Error, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};

const U8_MSB_EXTRACTOR: u8 = 0x80;
const STATUS_KIND_EXTRACTOR: u8 = 0xF0;
const STATUS_CHANNEL_EXTRACTOR: u8 = 0x0F;

const CONTROL_CHANGE: u8 = 0xB0;
const PROGRAM_CHANGE: u8 = 0xC0;

/// 7 bit MIDI data byte. Used for controller numbers, controller values and program numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[repr(transparent)]
pub struct DataByte(u8);

impl DataByte {
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(db: u8) -> Option<DataByte> {
        Option::when(db & U8_MSB_EXTRACTOR == 0, || DataByte(db))
    }
}

impl Display for DataByte {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct DataByteVisitor;

impl<'de> Visitor<'de> for DataByteVisitor {
    type Value = DataByte;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("Expecting data byte to be u8 between 0x00 and 0x7F.")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        let parse_res = u8::try_from(v).ok().and_then(DataByte::from_u8);

        match parse_res {
            None => Err(E::custom(format!(
                "Expecting data byte to be u8 between 0x00 and 0x7F. Got: {}.",
                v
            ))),
            Some(db) => Ok(db),
        }
    }
}

impl<'de> Deserialize<'de> for DataByte {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u8(DataByteVisitor)
    }
}

/// One-based MIDI channel, as the operator sees it (1-16).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[repr(transparent)]
pub struct MidiChannel(u8);

impl MidiChannel {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 16;

    pub fn as_u8(&self) -> u8 {
        self.0
    }

    pub fn from_u8(channel: u8) -> Option<MidiChannel> {
        Option::when((Self::MIN..=Self::MAX).contains(&channel), || {
            MidiChannel(channel)
        })
    }

    /// Transports report channels zero-based (0-15).
    pub fn from_transport(zero_based: u8) -> MidiChannel {
        MidiChannel((zero_based & STATUS_CHANNEL_EXTRACTOR) + 1)
    }
}

impl Display for MidiChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct MidiChannelVisitor;

impl<'de> Visitor<'de> for MidiChannelVisitor {
    type Value = MidiChannel;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("Expecting MIDI channel to be between 1 and 16.")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: Error,
    {
        let parse_res = u8::try_from(v).ok().and_then(MidiChannel::from_u8);

        match parse_res {
            None => Err(E::custom(format!(
                "Expecting MIDI channel to be between 1 and 16. Got: {}.",
                v
            ))),
            Some(channel) => Ok(channel),
        }
    }
}

impl<'de> Deserialize<'de> for MidiChannel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_u8(MidiChannelVisitor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlChange {
    pub channel: MidiChannel,
    pub controller: DataByte,
    pub value: DataByte,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramChange {
    pub channel: MidiChannel,
    pub number: DataByte,
}

/// The subset of channel voice messages the lights react to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MidiEvent {
    ControlChange(ControlChange),
    ProgramChange(ProgramChange),
}

impl MidiEvent {
    pub fn from_bytes(bytes: &[u8]) -> Option<MidiEvent> {
        let (&status, data) = bytes.split_first()?;
        if status & U8_MSB_EXTRACTOR == 0 {
            return None;
        }
        let channel = MidiChannel::from_transport(status & STATUS_CHANNEL_EXTRACTOR);

        match status & STATUS_KIND_EXTRACTOR {
            CONTROL_CHANGE => match data {
                [controller, value, ..] => Some(MidiEvent::ControlChange(ControlChange {
                    channel,
                    controller: DataByte::from_u8(*controller)?,
                    value: DataByte::from_u8(*value)?,
                })),
                _ => None,
            },
            PROGRAM_CHANGE => {
                let number = DataByte::from_u8(*data.first()?)?;
                Some(MidiEvent::ProgramChange(ProgramChange { channel, number }))
            }
            _ => None,
        }
    }
}
