use bimap::BiMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::{error::Error, op::OpKind, template::Template};

/// General form → (suboperand code, bit template).
///
/// A general form is the mnemonic followed by the comma separated operand
/// shapes. Shapes: `r`..`rrrr` integer register, `n`..`nnnn` immediate or
/// label, `fr` float register, `fnnn` float immediate, `ff` flag, `SPC`/`SPR`
/// special register. `(x)` is memory addressing, `(x,y)` is addressing with
/// an offset (`(x + y)` in source).
#[rustfmt::skip]
const FORMS: &[(&str, u8, &str)] = &[
    ("NOP", 0x00, ""),

    ("HALT", 0x00, ""),

    ("LD r,n", 0x00, "oooooooo AAAAAuuu BBBBBBBB"),
    ("LD rr,nn", 0x01, "oooooooo AAAAAuuu BBBBBBBB BBBBBBBB"),
    ("LD rrr,nnn", 0x02, "oooooooo AAAAAuuu BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD rrrr,nnnn", 0x03, "oooooooo AAAAAuuu BBBBBBBB BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD r,r", 0x04, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD rr,rr", 0x05, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD rrr,rrr", 0x06, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD rrrr,rrrr", 0x07, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD r,(nnn)", 0x08, "oooooooo AAAAAuuu BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD rr,(nnn)", 0x09, "oooooooo AAAAAuuu BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD rrr,(nnn)", 0x0A, "oooooooo AAAAAuuu BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD rrrr,(nnn)", 0x0B, "oooooooo AAAAAuuu BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD (nnn),r", 0x0C, "oooooooo AAAAAAAA AAAAAAAA AAAAAAAA BBBBBuuu"),
    ("LD (nnn),rr", 0x0D, "oooooooo AAAAAAAA AAAAAAAA AAAAAAAA BBBBBuuu"),
    ("LD (nnn),rrr", 0x0E, "oooooooo AAAAAAAA AAAAAAAA AAAAAAAA BBBBBuuu"),
    ("LD (nnn),rrrr", 0x0F, "oooooooo AAAAAAAA AAAAAAAA AAAAAAAA BBBBBuuu"),
    ("LD r,(rrr)", 0x10, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD rr,(rrr)", 0x11, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD rrr,(rrr)", 0x12, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD rrrr,(rrr)", 0x13, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD (rrr),r", 0x14, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD (rrr),rr", 0x15, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD (rrr),rrr", 0x16, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD (rrr),rrrr", 0x17, "oooooooo AAAAABBB BBuuuuuu"),
    ("LD r,(rrr,nnn)", 0x18, "oooooooo AAAAABBB BBuuuuuu CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("LD rr,(rrr,nnn)", 0x19, "oooooooo AAAAABBB BBuuuuuu CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("LD rrr,(rrr,nnn)", 0x1A, "oooooooo AAAAABBB BBuuuuuu CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("LD rrrr,(rrr,nnn)", 0x1B, "oooooooo AAAAABBB BBuuuuuu CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("LD fr,fr", 0x1C, "oooooooo AAAABBBB"),
    ("LD fr,fnnn", 0x1D, "oooooooo AAAAuuuu BBBBBBBB BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD fr,(nnn)", 0x1E, "oooooooo AAAAuuuu BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD (nnn),fr", 0x1F, "oooooooo AAAAAAAA AAAAAAAA AAAAAAAA BBBBuuuu"),
    ("LD SPC,nnn", 0x20, "oooooooo BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD SPR,nnn", 0x21, "oooooooo BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("LD rrr,SPC", 0x22, "oooooooo AAAAAuuu"),
    ("LD rrr,SPR", 0x23, "oooooooo AAAAAuuu"),
    ("LD r,r,n", 0x24, "oooooooo AAAAABBB BBCCCCCC CCuuuuuu"),
    ("LD rr,rr,nn", 0x25, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCuuuuuu"),
    ("LD rrr,rrr,nnn", 0x26, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCuuuuuu"),
    ("LD rrrr,rrrr,nnnn", 0x27, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCCCCCCC CCuuuuuu"),
    ("LD r,(rrr,nnn),n", 0x28, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDD DDuuuuuu"),
    ("LD rr,(rrr,nnn),nn", 0x29, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDD DDDDDDDD DDuuuuuu"),
    ("LD rrr,(rrr,nnn),nnn", 0x2A, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDD DDDDDDDD DDDDDDDD DDuuuuuu"),
    ("LD rrrr,(rrr,nnn),nnnn", 0x2B, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDD DDDDDDDD DDDDDDDD DDDDDDDD DDuuuuuu"),
    ("LD r,(nnn,nnn),n", 0x2C, "oooooooo AAAAABBB BBBBBBBB BBBBBBBB BBBBBCCC CCCCCCCC CCCCCCCC CCCCCDDD DDDDDuuu"),
    ("LD rr,(nnn,nnn),nn", 0x2D, "oooooooo AAAAABBB BBBBBBBB BBBBBBBB BBBBBCCC CCCCCCCC CCCCCCCC CCCCCDDD DDDDDDDD DDDDDuuu"),
    ("LD rrr,(nnn,nnn),nnn", 0x2E, "oooooooo AAAAABBB BBBBBBBB BBBBBBBB BBBBBCCC CCCCCCCC CCCCCCCC CCCCCDDD DDDDDDDD DDDDDDDD DDDDDuuu"),
    ("LD rrrr,(nnn,nnn),nnnn", 0x2F, "oooooooo AAAAABBB BBBBBBBB BBBBBBBB BBBBBCCC CCCCCCCC CCCCCCCC CCCCCDDD DDDDDDDD DDDDDDDD DDDDDDDD DDDDDuuu"),
    ("LD r,(rrr,nnn),r,n", 0x30, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDE EEEEEEEu"),
    ("LD rr,(rrr,nnn),rr,nn", 0x31, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDE EEEEEEEE EEEEEEEu"),
    ("LD rrr,(rrr,nnn),rrr,nnn", 0x32, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDE EEEEEEEE EEEEEEEE EEEEEEEu"),
    ("LD rrrr,(rrr,nnn),rrrr,nnnn", 0x33, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDE EEEEEEEE EEEEEEEE EEEEEEEE EEEEEEEu"),
    ("LD r,(rrr,nnn),(rrr,nnn),n", 0x34, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDE EEEEEEEE EEEEEEEE EEEEEEEF FFFFFFFu"),
    ("LD rr,(rrr,nnn),(rrr,nnn),nn", 0x35, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDE EEEEEEEE EEEEEEEE EEEEEEEF FFFFFFFF FFFFFFFu"),
    ("LD rrr,(rrr,nnn),(rrr,nnn),nnn", 0x36, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDE EEEEEEEE EEEEEEEE EEEEEEEF FFFFFFFF FFFFFFFF FFFFFFFu"),
    ("LD rrrr,(rrr,nnn),(rrr,nnn),nnnn", 0x37, "oooooooo AAAAABBB BBCCCCCC CCCCCCCC CCCCCCCC CCDDDDDE EEEEEEEE EEEEEEEE EEEEEEEF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFu"),

    ("ADD r,n", 0x00, "ooooooAA AAABBBBB BBBuuuuu"),
    ("ADD rr,nn", 0x01, "ooooooAA AAABBBBB BBBBBBBB BBBuuuuu"),
    ("ADD rrr,nnn", 0x02, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("ADD rrrr,nnnn", 0x03, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("ADD r,r", 0x04, "ooooooAA AAABBBBB"),
    ("ADD rr,rr", 0x05, "ooooooAA AAABBBBB"),
    ("ADD rrr,rrr", 0x06, "ooooooAA AAABBBBB"),
    ("ADD rrrr,rrrr", 0x07, "ooooooAA AAABBBBB"),
    ("ADD r,r,n", 0x08, "ooooooAA AAABBBBB CCCCCCCC"),
    ("ADD rr,rr,nn", 0x09, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC"),
    ("ADD rrr,rrr,nnn", 0x0A, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("ADD rrrr,rrrr,nnnn", 0x0B, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("ADD r,(nnn)", 0x0C, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("ADD rr,(nnn)", 0x0D, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("ADD rrr,(nnn)", 0x0E, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("ADD rrrr,(nnn)", 0x0F, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("ADD r,(rrr)", 0x10, "ooooooAA AAABBBBB"),
    ("ADD rr,(rrr)", 0x11, "ooooooAA AAABBBBB"),
    ("ADD rrr,(rrr)", 0x12, "ooooooAA AAABBBBB"),
    ("ADD rrrr,(rrr)", 0x13, "ooooooAA AAABBBBB"),
    ("ADD r,(rrr,nnn)", 0x14, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("ADD rr,(rrr,nnn)", 0x15, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("ADD rrr,(rrr,nnn)", 0x16, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("ADD rrrr,(rrr,nnn)", 0x17, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("ADD r,(rrr,nnn),n", 0x18, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD"),
    ("ADD rr,(rrr,nnn),nn", 0x19, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD DDDDDDDD"),
    ("ADD rrr,(rrr,nnn),nnn", 0x1A, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD DDDDDDDD DDDDDDDD"),
    ("ADD rrrr,(rrr,nnn),nnnn", 0x1B, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD DDDDDDDD DDDDDDDD DDDDDDDD"),
    ("ADD r,(nnn,nnn),n", 0x1C, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDuuuuu"),
    ("ADD rr,(nnn,nnn),nn", 0x1D, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDDDDDD DDDuuuuu"),
    ("ADD rrr,(nnn,nnn),nnn", 0x1E, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDDDDDD DDDDDDDD DDDuuuuu"),
    ("ADD rrrr,(nnn,nnn),nnnn", 0x1F, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDDDDDD DDDDDDDD DDDDDDDD DDDuuuuu"),
    ("ADD fr,fr", 0x20, "ooooooAA AABBBBuu"),
    ("ADD fr,fnnn", 0x21, "ooooooAA AABBBBBB BBBBBBBB BBBBBBBB BBBBBBBB BBuuuuuu"),
    ("ADD r,(rrr,nnn),r,n", 0x22, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEuuu"),
    ("ADD rr,(rrr,nnn),rr,nn", 0x23, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEuuu"),
    ("ADD rrr,(rrr,nnn),rrr,nnn", 0x24, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEuuu"),
    ("ADD rrrr,(rrr,nnn),rrrr,nnnn", 0x25, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEEEE EEEEEuuu"),
    ("ADD r,(rrr,nnn),(rrr,nnn),n", 0x26, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFuuu"),
    ("ADD rr,(rrr,nnn),(rrr,nnn),nn", 0x27, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFFFF FFFFFuuu"),
    ("ADD rrr,(rrr,nnn),(rrr,nnn),nnn", 0x28, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFFFF FFFFFFFF FFFFFuuu"),
    ("ADD rrrr,(rrr,nnn),(rrr,nnn),nnnn", 0x29, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFuuu"),

    ("SUB r,n", 0x00, "ooooooAA AAABBBBB BBBuuuuu"),
    ("SUB rr,nn", 0x01, "ooooooAA AAABBBBB BBBBBBBB BBBuuuuu"),
    ("SUB rrr,nnn", 0x02, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("SUB rrrr,nnnn", 0x03, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("SUB r,r", 0x04, "ooooooAA AAABBBBB"),
    ("SUB rr,rr", 0x05, "ooooooAA AAABBBBB"),
    ("SUB rrr,rrr", 0x06, "ooooooAA AAABBBBB"),
    ("SUB rrrr,rrrr", 0x07, "ooooooAA AAABBBBB"),
    ("SUB r,r,n", 0x08, "ooooooAA AAABBBBB CCCCCCCC"),
    ("SUB rr,rr,nn", 0x09, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC"),
    ("SUB rrr,rrr,nnn", 0x0A, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("SUB rrrr,rrrr,nnnn", 0x0B, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("SUB r,(nnn)", 0x0C, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("SUB rr,(nnn)", 0x0D, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("SUB rrr,(nnn)", 0x0E, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("SUB rrrr,(nnn)", 0x0F, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("SUB r,(rrr)", 0x10, "ooooooAA AAABBBBB"),
    ("SUB rr,(rrr)", 0x11, "ooooooAA AAABBBBB"),
    ("SUB rrr,(rrr)", 0x12, "ooooooAA AAABBBBB"),
    ("SUB rrrr,(rrr)", 0x13, "ooooooAA AAABBBBB"),
    ("SUB r,(rrr,nnn)", 0x14, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("SUB rr,(rrr,nnn)", 0x15, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("SUB rrr,(rrr,nnn)", 0x16, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("SUB rrrr,(rrr,nnn)", 0x17, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("SUB r,(rrr,nnn),n", 0x18, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD"),
    ("SUB rr,(rrr,nnn),nn", 0x19, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD DDDDDDDD"),
    ("SUB rrr,(rrr,nnn),nnn", 0x1A, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD DDDDDDDD DDDDDDDD"),
    ("SUB rrrr,(rrr,nnn),nnnn", 0x1B, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD DDDDDDDD DDDDDDDD DDDDDDDD"),
    ("SUB r,(nnn,nnn),n", 0x1C, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDuuuuu"),
    ("SUB rr,(nnn,nnn),nn", 0x1D, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDDDDDD DDDuuuuu"),
    ("SUB rrr,(nnn,nnn),nnn", 0x1E, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDDDDDD DDDDDDDD DDDuuuuu"),
    ("SUB rrrr,(nnn,nnn),nnnn", 0x1F, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDDDDDD DDDDDDDD DDDDDDDD DDDuuuuu"),
    ("SUB fr,fr", 0x20, "ooooooAA AABBBBuu"),
    ("SUB fr,fnnn", 0x21, "ooooooAA AABBBBBB BBBBBBBB BBBBBBBB BBBBBBBB BBuuuuuu"),
    ("SUB r,(rrr,nnn),r,n", 0x22, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEuuu"),
    ("SUB rr,(rrr,nnn),rr,nn", 0x23, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEuuu"),
    ("SUB rrr,(rrr,nnn),rrr,nnn", 0x24, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEuuu"),
    ("SUB rrrr,(rrr,nnn),rrrr,nnnn", 0x25, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEEEE EEEEEuuu"),
    ("SUB r,(rrr,nnn),(rrr,nnn),n", 0x26, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFuuu"),
    ("SUB rr,(rrr,nnn),(rrr,nnn),nn", 0x27, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFFFF FFFFFuuu"),
    ("SUB rrr,(rrr,nnn),(rrr,nnn),nnn", 0x28, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFFFF FFFFFFFF FFFFFuuu"),
    ("SUB rrrr,(rrr,nnn),(rrr,nnn),nnnn", 0x29, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFuuu"),

    ("DIV r,n", 0x00, "ooooooAA AAABBBBB BBBuuuuu"),
    ("DIV rr,nn", 0x01, "ooooooAA AAABBBBB BBBBBBBB BBBuuuuu"),
    ("DIV rrr,nnn", 0x02, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("DIV rrrr,nnnn", 0x03, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("DIV r,r", 0x04, "ooooooAA AAABBBBB"),
    ("DIV rr,rr", 0x05, "ooooooAA AAABBBBB"),
    ("DIV rrr,rrr", 0x06, "ooooooAA AAABBBBB"),
    ("DIV rrrr,rrrr", 0x07, "ooooooAA AAABBBBB"),
    ("DIV r,r,n", 0x08, "ooooooAA AAABBBBB CCCCCCCC"),
    ("DIV rr,rr,nn", 0x09, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC"),
    ("DIV rrr,rrr,nnn", 0x0A, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("DIV rrrr,rrrr,nnnn", 0x0B, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("DIV r,(nnn)", 0x0C, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("DIV rr,(nnn)", 0x0D, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("DIV rrr,(nnn)", 0x0E, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("DIV rrrr,(nnn)", 0x0F, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("DIV r,(rrr)", 0x10, "ooooooAA AAABBBBB"),
    ("DIV rr,(rrr)", 0x11, "ooooooAA AAABBBBB"),
    ("DIV rrr,(rrr)", 0x12, "ooooooAA AAABBBBB"),
    ("DIV rrrr,(rrr)", 0x13, "ooooooAA AAABBBBB"),
    ("DIV r,(rrr,nnn)", 0x14, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("DIV rr,(rrr,nnn)", 0x15, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("DIV rrr,(rrr,nnn)", 0x16, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("DIV rrrr,(rrr,nnn)", 0x17, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC"),
    ("DIV r,(rrr,nnn),n", 0x18, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD"),
    ("DIV rr,(rrr,nnn),nn", 0x19, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD DDDDDDDD"),
    ("DIV rrr,(rrr,nnn),nnn", 0x1A, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD DDDDDDDD DDDDDDDD"),
    ("DIV rrrr,(rrr,nnn),nnnn", 0x1B, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDDDD DDDDDDDD DDDDDDDD DDDDDDDD"),
    ("DIV r,(nnn,nnn),n", 0x1C, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDuuuuu"),
    ("DIV rr,(nnn,nnn),nn", 0x1D, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDDDDDD DDDuuuuu"),
    ("DIV rrr,(nnn,nnn),nnn", 0x1E, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDDDDDD DDDDDDDD DDDuuuuu"),
    ("DIV rrrr,(nnn,nnn),nnnn", 0x1F, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBCCCCC CCCCCCCC CCCCCCCC CCCDDDDD DDDDDDDD DDDDDDDD DDDDDDDD DDDuuuuu"),
    ("DIV fr,fr", 0x20, "ooooooAA AABBBBuu"),
    ("DIV fr,fnnn", 0x21, "ooooooAA AABBBBBB BBBBBBBB BBBBBBBB BBBBBBBB BBuuuuuu"),
    ("DIV r,(rrr,nnn),r,n", 0x22, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEuuu"),
    ("DIV rr,(rrr,nnn),rr,nn", 0x23, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEuuu"),
    ("DIV rrr,(rrr,nnn),rrr,nnn", 0x24, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEuuu"),
    ("DIV rrrr,(rrr,nnn),rrrr,nnnn", 0x25, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEEEE EEEEEuuu"),
    ("DIV r,(rrr,nnn),(rrr,nnn),n", 0x26, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFuuu"),
    ("DIV rr,(rrr,nnn),(rrr,nnn),nn", 0x27, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFFFF FFFFFuuu"),
    ("DIV rrr,(rrr,nnn),(rrr,nnn),nnn", 0x28, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFFFF FFFFFFFF FFFFFuuu"),
    ("DIV rrrr,(rrr,nnn),(rrr,nnn),nnnn", 0x29, "ooooooAA AAABBBBB CCCCCCCC CCCCCCCC CCCCCCCC DDDDDEEE EEEEEEEE EEEEEEEE EEEEEFFF FFFFFFFF FFFFFFFF FFFFFFFF FFFFFuuu"),

    ("MUL r,r", 0x00, "ooooooAA AAABBBBB"),
    ("MUL rr,rr", 0x01, "ooooooAA AAABBBBB"),
    ("MUL rrr,rrr", 0x02, "ooooooAA AAABBBBB"),
    ("MUL rrrr,rrrr", 0x03, "ooooooAA AAABBBBB"),
    ("MUL fr,fr", 0x04, "ooooooAA AABBBBuu"),
    ("MUL fr,fnnn", 0x05, "ooooooAA AABBBBBB BBBBBBBB BBBBBBBB BBBBBBBB BBuuuuuu"),

    ("INC r", 0x00, "ooooooAA AAAuuuuu"),
    ("INC rr", 0x01, "ooooooAA AAAuuuuu"),
    ("INC rrr", 0x02, "ooooooAA AAAuuuuu"),
    ("INC rrrr", 0x03, "ooooooAA AAAuuuuu"),
    ("INC (rrr)", 0x04, "ooooooAA AAAuuuuu"),
    ("INC (nnn)", 0x05, "ooooooAA AAAAAAAA AAAAAAAA AAAAAAuu"),

    ("DEC r", 0x00, "ooooooAA AAAuuuuu"),
    ("DEC rr", 0x01, "ooooooAA AAAuuuuu"),
    ("DEC rrr", 0x02, "ooooooAA AAAuuuuu"),
    ("DEC rrrr", 0x03, "ooooooAA AAAuuuuu"),
    ("DEC (rrr)", 0x04, "ooooooAA AAAuuuuu"),
    ("DEC (nnn)", 0x05, "ooooooAA AAAAAAAA AAAAAAAA AAAAAAuu"),

    ("AND r,r", 0x00, "ooooooAA AAABBBBB"),
    ("AND rr,rr", 0x01, "ooooooAA AAABBBBB"),
    ("AND rrr,rrr", 0x02, "ooooooAA AAABBBBB"),
    ("AND rrrr,rrrr", 0x03, "ooooooAA AAABBBBB"),
    ("AND r,nnn", 0x04, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("AND rr,nnn", 0x05, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("AND rrr,nnn", 0x06, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("AND rrrr,nnn", 0x07, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("AND r,(rrr)", 0x08, "ooooooAA AAABBBBB"),
    ("AND rr,(rrr)", 0x09, "ooooooAA AAABBBBB"),
    ("AND rrr,(rrr)", 0x0A, "ooooooAA AAABBBBB"),
    ("AND rrrr,(rrr)", 0x0B, "ooooooAA AAABBBBB"),

    ("OR r,r", 0x00, "ooooooAA AAABBBBB"),
    ("OR rr,rr", 0x01, "ooooooAA AAABBBBB"),
    ("OR rrr,rrr", 0x02, "ooooooAA AAABBBBB"),
    ("OR rrrr,rrrr", 0x03, "ooooooAA AAABBBBB"),
    ("OR r,nnn", 0x04, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("OR rr,nnn", 0x05, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("OR rrr,nnn", 0x06, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("OR rrrr,nnn", 0x07, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("OR r,(rrr)", 0x08, "ooooooAA AAABBBBB"),
    ("OR rr,(rrr)", 0x09, "ooooooAA AAABBBBB"),
    ("OR rrr,(rrr)", 0x0A, "ooooooAA AAABBBBB"),
    ("OR rrrr,(rrr)", 0x0B, "ooooooAA AAABBBBB"),

    ("XOR r,r", 0x00, "ooooooAA AAABBBBB"),
    ("XOR rr,rr", 0x01, "ooooooAA AAABBBBB"),
    ("XOR rrr,rrr", 0x02, "ooooooAA AAABBBBB"),
    ("XOR rrrr,rrrr", 0x03, "ooooooAA AAABBBBB"),
    ("XOR r,nnn", 0x04, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("XOR rr,nnn", 0x05, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("XOR rrr,nnn", 0x06, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("XOR rrrr,nnn", 0x07, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("XOR r,(rrr)", 0x08, "ooooooAA AAABBBBB"),
    ("XOR rr,(rrr)", 0x09, "ooooooAA AAABBBBB"),
    ("XOR rrr,(rrr)", 0x0A, "ooooooAA AAABBBBB"),
    ("XOR rrrr,(rrr)", 0x0B, "ooooooAA AAABBBBB"),

    ("CP r,r", 0x00, "ooooooAA AAABBBBB"),
    ("CP rr,rr", 0x01, "ooooooAA AAABBBBB"),
    ("CP rrr,rrr", 0x02, "ooooooAA AAABBBBB"),
    ("CP rrrr,rrrr", 0x03, "ooooooAA AAABBBBB"),
    ("CP r,nnn", 0x04, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("CP rr,nnn", 0x05, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("CP rrr,nnn", 0x06, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("CP rrrr,nnn", 0x07, "ooooooAA AAABBBBB BBBBBBBB BBBBBBBB BBBuuuuu"),
    ("CP fr,fr", 0x08, "ooooooAA AABBBBuu"),
    ("CP fr,fnnn", 0x09, "ooooooAA AABBBBBB BBBBBBBB BBBBBBBB BBBBBBBB BBuuuuuu"),

    ("JP nnn", 0x00, "oooouuuu AAAAAAAA AAAAAAAA AAAAAAAA"),
    ("JP ff,nnn", 0x01, "ooooAAAA BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("JP rrr", 0x02, "ooooAAAA Auuuuuuu"),
    ("JP ff,rrr", 0x03, "ooooAAAA BBBBBuuu"),

    ("CALL nnn", 0x00, "oooouuuu AAAAAAAA AAAAAAAA AAAAAAAA"),
    ("CALL ff,nnn", 0x01, "ooooAAAA BBBBBBBB BBBBBBBB BBBBBBBB"),
    ("CALL rrr", 0x02, "ooooAAAA Auuuuuuu"),
    ("CALL ff,rrr", 0x03, "ooooAAAA BBBBBuuu"),

    ("JR nnn", 0x00, "oooouuuu AAAAAAAA AAAAAAAA AAAAAAAA"),
    ("JR ff,nnn", 0x01, "ooooAAAA BBBBBBBB BBBBBBBB BBBBBBBB"),

    ("CALLR nnn", 0x00, "oooouuuu AAAAAAAA AAAAAAAA AAAAAAAA"),
    ("CALLR ff,nnn", 0x01, "ooooAAAA BBBBBBBB BBBBBBBB BBBBBBBB"),

    ("RET", 0x00, ""),
    ("RET ff", 0x01, "ooooAAAA"),

    ("PUSH r", 0x00, "ooooooAA AAAuuuuu"),
    ("PUSH rr", 0x01, "ooooooAA AAAuuuuu"),
    ("PUSH rrr", 0x02, "ooooooAA AAAuuuuu"),
    ("PUSH rrrr", 0x03, "ooooooAA AAAuuuuu"),
    ("PUSH fr", 0x04, "ooooooAA AAuuuuuu"),

    ("POP r", 0x00, "ooooooAA AAAuuuuu"),
    ("POP rr", 0x01, "ooooooAA AAAuuuuu"),
    ("POP rrr", 0x02, "ooooooAA AAAuuuuu"),
    ("POP rrrr", 0x03, "ooooooAA AAAuuuuu"),
    ("POP fr", 0x04, "ooooooAA AAuuuuuu"),
];

pub static ISA: Lazy<Isa> =
    Lazy::new(|| Isa::new().unwrap_or_else(|err| panic!("Broken instruction table: {err}")));

#[derive(Debug, Clone)]
pub struct Form {
    pub op: OpKind,
    pub sub: u8,
    pub template: Template,
}

impl Form {
    /// Encoded length including the opcode byte.
    pub fn len(&self) -> usize {
        1 + self.template.len()
    }

    pub fn encode(&self, operands: &[u32]) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        bytes.push(self.op.opcode());
        bytes.extend(self.template.pack(self.sub, operands));
        bytes
    }
}

pub struct Isa {
    forms: HashMap<String, Form>,
    index: BiMap<String, (u8, u8)>,
}

impl Isa {
    pub fn new() -> Result<Self, Error> {
        let mut forms = HashMap::new();
        let mut index = BiMap::new();
        for (general, sub, format) in FORMS {
            let mnemonic = general.split_whitespace().next().unwrap_or_default();
            let op = OpKind::parse(mnemonic)?;
            let template = Template::parse(format)?;
            let fits = match template.sub_width() {
                0 => *sub == 0,
                8 => true,
                width => (*sub as u32) < (1 << width),
            };
            if !fits {
                return Err(Error::SubTooWide(format.to_string(), *sub));
            }
            if index
                .insert_no_overwrite(general.to_string(), (op.opcode(), *sub))
                .is_err()
            {
                return Err(Error::DuplicateForm(general.to_string()));
            }
            forms.insert(general.to_string(), Form { op, sub: *sub, template });
        }
        Ok(Isa { forms, index })
    }

    pub fn form(&self, general: &str) -> Option<&Form> {
        self.forms.get(general)
    }

    /// Reverse lookup from the first two encoded fields.
    pub fn general_form(&self, opcode: u8, sub: u8) -> Option<&str> {
        self.index.get_by_right(&(opcode, sub)).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_loads() {
        assert_eq!(ISA.len(), FORMS.len());
    }

    #[test]
    fn test_ld_r_n() {
        let form = ISA.form("LD r,n").unwrap();
        assert_eq!(form.len(), 4);
        assert_eq!(form.encode(&[0, 0x10]), vec![OpKind::LD.opcode(), 0x00, 0x00, 0x10]);
    }

    #[test]
    fn test_reverse_lookup() {
        let form = ISA.form("JP ff,nnn").unwrap();
        assert_eq!(
            ISA.general_form(form.op.opcode(), form.sub),
            Some("JP ff,nnn")
        );
        assert_eq!(ISA.general_form(0xFF, 0), None);
    }

    #[test]
    fn test_no_operand_forms() {
        assert_eq!(ISA.form("NOP").unwrap().encode(&[]), vec![0x00]);
        assert_eq!(ISA.form("RET").unwrap().len(), 1);
        assert_eq!(ISA.form("RET ff").unwrap().len(), 2);
    }

    #[test]
    fn test_operand_widths() {
        let form = ISA.form("ADD rr,(rrr,nnn),nn").unwrap();
        assert_eq!(form.template.operand_width(0), 5);
        assert_eq!(form.template.operand_width(1), 5);
        assert_eq!(form.template.operand_width(2), 24);
        assert_eq!(form.template.operand_width(3), 16);
    }
}
